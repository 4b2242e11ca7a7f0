//! Raw API record -> [`LogEntry`].
//!
//! Pure and side-effect free. A record is dropped only when it is not an
//! object or has no usable timestamp; every other field is optional and a
//! mistyped value is treated as absent.

use serde_json::{Map, Value};

use crate::types::{LogEntry, QueryStatus, Reason};
use crate::utils::datetime;

/// Why a raw record could not become a [`LogEntry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSkipped {
    NotAnObject,
    MissingTimestamp,
    InvalidTimestamp(String),
}

impl std::fmt::Display for RecordSkipped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "record is not a JSON object"),
            Self::MissingTimestamp => write!(f, "record has no timestamp"),
            Self::InvalidTimestamp(raw) => write!(f, "unparsable timestamp: {raw}"),
        }
    }
}

impl std::error::Error for RecordSkipped {}

/// Convert one raw record into a canonical entry.
pub fn normalize(raw: &Value) -> Result<LogEntry, RecordSkipped> {
    let obj = raw.as_object().ok_or(RecordSkipped::NotAnObject)?;

    let ts_value = obj
        .get("timestamp")
        .filter(|v| !v.is_null())
        .ok_or(RecordSkipped::MissingTimestamp)?;
    let timestamp = datetime::parse_value(ts_value)
        .ok_or_else(|| RecordSkipped::InvalidTimestamp(ts_value.to_string()))?;

    let device = obj.get("device").and_then(Value::as_object);

    let mut entry = LogEntry::new(timestamp);
    entry.domain = string_field(obj, &["domain"]);
    entry.root = string_field(obj, &["root"]);
    entry.tracker = string_field(obj, &["tracker"]);
    entry.status = string_field(obj, &["status"]).map_or(QueryStatus::Default, QueryStatus::from);
    entry.reasons = reasons(obj.get("reasons"));
    entry.device_id = device
        .and_then(|d| string_field(d, &["id"]))
        .or_else(|| string_field(obj, &["deviceId", "device_id"]));
    entry.device_name = device
        .and_then(|d| string_field(d, &["name"]))
        .or_else(|| string_field(obj, &["deviceName", "device_name"]));
    entry.device_model = device
        .and_then(|d| string_field(d, &["model"]))
        .or_else(|| string_field(obj, &["deviceModel", "device_model"]));
    entry.client_ip = string_field(obj, &["clientIp", "client_ip"]);
    entry.client = string_field(obj, &["client"]);
    entry.protocol = string_field(obj, &["protocol"]);
    entry.query_type = string_field(obj, &["type", "queryType", "query_type"]);
    entry.dnssec = obj.get("dnssec").and_then(Value::as_bool);
    entry.encrypted = obj.get("encrypted").and_then(Value::as_bool);

    Ok(entry)
}

/// First key holding a string; numbers are stringified, anything else is absent.
fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn reasons(value: Option<&Value>) -> Vec<Reason> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(id) => Some(Reason {
                id: id.clone(),
                name: None,
            }),
            Value::Object(obj) => {
                let id = string_field(obj, &["id"]);
                let name = string_field(obj, &["name"]);
                // 只有 name 时用 name 作为 id
                id.or_else(|| name.clone()).map(|id| Reason { id, name })
            }
            _ => None,
        })
        .collect()
}
