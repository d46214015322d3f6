// Formatter - Locale-styled rendering of readings for the panel
use crate::domain::telemetry::TelemetryReading;
use crate::infrastructure::config::{DEFAULT_DATETIME_FORMAT, PanelConfig};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeZone};
use std::fmt;

pub const ICON_SLEEP: &str = "🌙";
pub const ICON_ACTIVE: &str = "☀️";

/// Render `value` with `decimals` fractional digits and thousands grouping.
///
/// EU style swaps the separators (`1.234,5` instead of `1,234.5`). Grouping
/// only touches the integer digits; a leading minus sign is kept as-is.
/// Halves round away from zero and a result of `-0` prints as `0`.
pub fn format_number(value: f64, decimals: usize, use_eu_format: bool) -> String {
    let (decimal_sep, group_sep) = if use_eu_format { (',', '.') } else { ('.', ',') };

    let fixed = format!("{:.*}", decimals, round_half_away(value, decimals));
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(group_sep);
        }
        out.push(digit);
    }
    if let Some(frac_part) = frac_part {
        out.push(decimal_sep);
        out.push_str(frac_part);
    }
    out
}

fn round_half_away(value: f64, decimals: usize) -> f64 {
    let scale = 10f64.powi(decimals.min(i32::MAX as usize) as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / scale;
    // Drops the sign of -0
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Short panel label. The sign of the power flow is dropped.
pub fn format_label(power_watts: f64, use_eu_format: bool) -> String {
    if power_watts == 0.0 {
        return ICON_SLEEP.to_string();
    }
    format!(
        "{} {} W",
        ICON_ACTIVE,
        format_number(power_watts.abs(), 1, use_eu_format)
    )
}

/// Format a timestamp with a strftime spec, falling back to the default
/// spec when `format` does not parse.
pub fn format_datetime<Tz>(at: &DateTime<Tz>, format: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return at.format(DEFAULT_DATETIME_FORMAT).to_string();
    }
    at.format_with_items(items.iter()).to_string()
}

pub fn format_tooltip<Tz>(
    reading: &TelemetryReading,
    config: &PanelConfig,
    last_update: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let eu = config.use_eu_format;
    let (temperature, unit) = if config.use_fahrenheit {
        (reading.temperature.in_fahrenheit(), "°F")
    } else {
        (reading.temperature.in_celsius(), "°C")
    };
    // Validated readings always carry at least one unit
    let temperature = temperature.unwrap_or(f64::NAN);

    format!(
        "Power: {} W\nVoltage: {} V\nCurrent: {} A\nTemperature: {} {}\nLast updated: {}",
        format_number(reading.power_watts, 1, eu),
        format_number(reading.voltage_volts, 1, eu),
        format_number(reading.current_amps, 3, eu),
        format_number(temperature, 1, eu),
        unit,
        format_datetime(last_update, &config.datetime_format),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::Temperature;
    use chrono::Utc;

    fn reading(power: f64) -> TelemetryReading {
        TelemetryReading::new(power, 230.1, 0.653, Temperature::new(Some(42.3), None))
    }

    fn at_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 5).unwrap()
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(1234.5, 1, false), "1,234.5");
        assert_eq!(format_number(1234.5, 1, true), "1.234,5");
        assert_eq!(format_number(0.125, 3, false), "0.125");
        assert_eq!(format_number(999.0, 1, false), "999.0");
        assert_eq!(format_number(1234567.891, 2, false), "1,234,567.89");
        assert_eq!(format_number(1234567.891, 2, true), "1.234.567,89");
    }

    #[test]
    fn test_format_number_grouping_skips_fraction() {
        assert_eq!(format_number(1.23456, 4, false), "1.2346");
        assert_eq!(format_number(12345.0, 0, false), "12,345");
    }

    #[test]
    fn test_format_number_rounds_halves_up() {
        assert_eq!(format_number(12.25, 1, false), "12.3");
        assert_eq!(format_number(0.0625, 3, false), "0.063");
        assert_eq!(format_number(-12.25, 1, false), "-12.3");
        assert_eq!(format_label(12.25, false), "☀️ 12.3 W");
    }

    #[test]
    fn test_format_number_drops_negative_zero() {
        assert_eq!(format_number(-0.0, 1, false), "0.0");
        assert_eq!(format_number(-0.0, 3, true), "0,000");
        assert_eq!(format_number(-0.00004, 3, false), "0.000");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-1234.5, 1, false), "-1,234.5");
        assert_eq!(format_number(-123.0, 1, true), "-123,0");
    }

    #[test]
    fn test_label_sleeping() {
        assert_eq!(format_label(0.0, false), ICON_SLEEP);
        assert_eq!(format_label(-0.0, true), ICON_SLEEP);
    }

    #[test]
    fn test_label_active_uses_absolute_value() {
        let label = format_label(-1500.26, false);
        assert!(label.starts_with(ICON_ACTIVE));
        assert!(label.ends_with(" W"));
        assert_eq!(label, "☀️ 1,500.3 W");

        assert_eq!(format_label(150.2, true), "☀️ 150,2 W");
    }

    #[test]
    fn test_tooltip_celsius() {
        let config = PanelConfig::default();
        let tooltip = format_tooltip(&reading(150.2), &config, &at_noon());
        assert_eq!(
            tooltip,
            "Power: 150.2 W\nVoltage: 230.1 V\nCurrent: 0.653 A\nTemperature: 42.3 °C\nLast updated: 2024-03-09 12:30:05"
        );
    }

    #[test]
    fn test_tooltip_fahrenheit_eu() {
        let config = PanelConfig {
            use_fahrenheit: true,
            use_eu_format: true,
            datetime_format: "%d.%m.%Y %H:%M".to_string(),
            ..PanelConfig::default()
        };
        let mut reading = reading(2048.0);
        reading.temperature = Temperature::new(Some(42.3), Some(108.1));

        let tooltip = format_tooltip(&reading, &config, &at_noon());
        assert_eq!(
            tooltip,
            "Power: 2.048,0 W\nVoltage: 230,1 V\nCurrent: 0,653 A\nTemperature: 108,1 °F\nLast updated: 09.03.2024 12:30"
        );
    }

    #[test]
    fn test_tooltip_converts_missing_unit() {
        let config = PanelConfig {
            use_fahrenheit: true,
            ..PanelConfig::default()
        };
        let mut reading = reading(1.0);
        reading.temperature = Temperature::new(Some(100.0), None);

        let tooltip = format_tooltip(&reading, &config, &at_noon());
        assert!(tooltip.contains("Temperature: 212.0 °F"));
    }

    #[test]
    fn test_invalid_datetime_format_falls_back() {
        assert_eq!(format_datetime(&at_noon(), "%Q"), "2024-03-09 12:30:05");
        assert_eq!(format_datetime(&at_noon(), "%H:%M"), "12:30");
    }
}
