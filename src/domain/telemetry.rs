// Telemetry domain models

/// Device temperature as reported by the plug. At least one unit is present
/// on every reading that passed validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature {
    pub celsius: Option<f64>,
    pub fahrenheit: Option<f64>,
}

impl Temperature {
    pub fn new(celsius: Option<f64>, fahrenheit: Option<f64>) -> Self {
        Self {
            celsius,
            fahrenheit,
        }
    }

    pub fn in_celsius(&self) -> Option<f64> {
        self.celsius
            .or_else(|| self.fahrenheit.map(|f| (f - 32.0) * 5.0 / 9.0))
    }

    pub fn in_fahrenheit(&self) -> Option<f64> {
        self.fahrenheit
            .or_else(|| self.celsius.map(|c| c * 9.0 / 5.0 + 32.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryReading {
    pub power_watts: f64,
    pub voltage_volts: f64,
    pub current_amps: f64,
    pub temperature: Temperature,
}

impl TelemetryReading {
    pub fn new(
        power_watts: f64,
        voltage_volts: f64,
        current_amps: f64,
        temperature: Temperature,
    ) -> Self {
        Self {
            power_watts,
            voltage_volts,
            current_amps,
            temperature,
        }
    }
}
