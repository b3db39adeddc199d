//! Status message schema
//!
//! One JSON object per line. Every field is optional: the host leaves out
//! whatever it could not sample and the display keeps its previous value.
//!
//! ```text
//! { "cpu": number, "ram": integer, "ram_used": integer,
//!   "weather": {"temp": number}, "host": string, "time": integer,
//!   "uptime": integer, "disk_free": integer,
//!   "net": {"rx": number, "tx": number}, "app": string }
//! ```
//!
//! Units: `ram`, `ram_used` and `disk_free` in KiB, `uptime` and `time` in
//! seconds, `net` rates in KiB/s, `weather.temp` in °C. Unknown keys are
//! ignored so the host may send extra fields.
//!
//! A field holding the wrong JSON type reads as absent; the rest of the
//! record still applies. Integer fields also accept integral floats
//! (`8000000.0`). Only text that is not a JSON object fails to decode.

use alloc::string::String;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Weather block (only the temperature is displayed)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Outside temperature in °C
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub temp: Option<f32>,
}

/// Network throughput block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetRates {
    /// Receive rate in KiB/s
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub rx: Option<f32>,
    /// Transmit rate in KiB/s
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub tx: Option<f32>,
}

/// A single status record as sent by the host
///
/// `None` means "not present in this record", which is different from zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    /// CPU usage in percent (0-100)
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f32>,
    /// Total RAM in KiB
    #[serde(default, deserialize_with = "integer", skip_serializing_if = "Option::is_none")]
    pub ram: Option<i64>,
    /// Used RAM in KiB
    #[serde(default, deserialize_with = "integer", skip_serializing_if = "Option::is_none")]
    pub ram_used: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    /// Host name
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Host wall clock, UNIX seconds
    #[serde(default, deserialize_with = "integer", skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    /// Host uptime in seconds
    #[serde(default, deserialize_with = "integer", skip_serializing_if = "Option::is_none")]
    pub uptime: Option<i64>,
    /// Free space on the host's main disk in KiB
    #[serde(default, deserialize_with = "integer", skip_serializing_if = "Option::is_none")]
    pub disk_free: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub net: Option<NetRates>,
    /// Foreground application name, shown as the header title
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
}

/// Errors that can occur while decoding a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Not valid JSON
    Syntax { line: usize, column: usize },
    /// Valid JSON but not a status object (wrong root or field type)
    Data { line: usize, column: usize },
    /// Record ended in the middle of a value
    Eof,
    /// Reader failure (not produced when decoding from a string)
    Io,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        let (line, column) = (err.line(), err.column());
        match err.classify() {
            Category::Syntax => DecodeError::Syntax { line, column },
            Category::Data => DecodeError::Data { line, column },
            Category::Eof => DecodeError::Eof,
            Category::Io => DecodeError::Io,
        }
    }
}

/// Errors that can occur while encoding a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Serializer rejected the message
    Serialize,
}

impl StatusMessage {
    /// Parse one record
    ///
    /// The root must be a JSON object; an array or scalar is a
    /// [`DecodeError::Data`].
    pub fn decode(line: &str) -> Result<Self, DecodeError> {
        let object: Map<String, Value> = serde_json::from_str(line)?;
        Ok(Self::deserialize(Value::Object(object))?)
    }

    /// Encode as a compact JSON record, newline-terminated
    ///
    /// Absent fields are omitted rather than sent as `null`.
    pub fn to_line(&self) -> Result<String, EncodeError> {
        let mut line = serde_json::to_string(self).map_err(|_| EncodeError::Serialize)?;
        line.push('\n');
        Ok(line)
    }
}

/// Field of the expected type, or `None` for any other JSON value
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Integer field; integral floats are accepted, anything else is `None`
fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        _ => None,
    })
}

fn integral(x: f64) -> Option<i64> {
    // 2^63
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if !(-LIMIT..LIMIT).contains(&x) {
        return None;
    }
    let i = x as i64;
    (i as f64 == x).then_some(i)
}
