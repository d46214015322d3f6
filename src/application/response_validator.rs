// Response validator - Turns raw device bytes into a typed reading
use crate::domain::telemetry::{TelemetryReading, Temperature};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("decode")]
    Decode,

    #[error("invalid format")]
    InvalidFormat,

    #[error("invalid data types")]
    InvalidDataTypes,
}

impl DataError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            DataError::Decode => "decode",
            DataError::InvalidFormat => "invalid_format",
            DataError::InvalidDataTypes => "invalid_data_types",
        }
    }
}

/// Parse a `Switch.GetStatus` style body.
///
/// `apower`, `voltage` and `current` are coerced the way a loosely typed
/// client would (numeric strings, booleans and null are accepted), but the
/// temperature entries must be real JSON numbers. Any violated rule fails
/// the whole parse.
pub fn parse(raw: &[u8]) -> Result<TelemetryReading, DataError> {
    let text = std::str::from_utf8(raw).map_err(|_| DataError::Decode)?;

    let value: Value = serde_json::from_str(text).map_err(|_| DataError::InvalidFormat)?;
    let Value::Object(fields) = value else {
        return Err(DataError::InvalidFormat);
    };

    let power = coerce_number(fields.get("apower"));
    let voltage = coerce_number(fields.get("voltage"));
    let current = coerce_number(fields.get("current"));
    if !(power.is_finite() && voltage.is_finite() && current.is_finite()) {
        return Err(DataError::InvalidDataTypes);
    }

    let temperature = match fields.get("temperature") {
        Some(Value::Object(temps)) => parse_temperature(temps)?,
        _ => return Err(DataError::InvalidDataTypes),
    };

    Ok(TelemetryReading::new(power, voltage, current, temperature))
}

fn parse_temperature(temps: &Map<String, Value>) -> Result<Temperature, DataError> {
    let celsius = temps.get("tC").and_then(Value::as_f64);
    let fahrenheit = temps.get("tF").and_then(Value::as_f64);

    if celsius.is_none() && fahrenheit.is_none() {
        return Err(DataError::InvalidDataTypes);
    }
    Ok(Temperature::new(celsius, fahrenheit))
}

/// Loose numeric coercion in the style of JavaScript's `Number()`.
/// Missing fields and objects become NaN.
fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_numeric_str(s),
        Some(Value::Array(items)) => coerce_array(items),
        Some(Value::Object(_)) => f64::NAN,
    }
}

/// An array coerces through its comma-joined text: empty is 0, a single
/// element coerces like its text form, anything longer contains a comma.
fn coerce_array(items: &[Value]) -> f64 {
    match items {
        [] => 0.0,
        [item] => match item {
            Value::Null => 0.0,
            Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Value::String(s) => parse_numeric_str(s),
            Value::Array(inner) => coerce_array(inner),
            Value::Bool(_) | Value::Object(_) => f64::NAN,
        },
        _ => f64::NAN,
    }
}

fn parse_numeric_str(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    match radix {
        // from_str_radix would accept a sign after the prefix
        Some(_) if s[2..].starts_with('+') => f64::NAN,
        Some(radix) => u128::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN),
        None => s.parse::<f64>().unwrap_or(f64::NAN),
    }
}
