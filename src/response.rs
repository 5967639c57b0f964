//! Response parsing and validation
//!
//! Every response line is parsed to a JSON object and checked for
//! service-reported `warning`/`error` fields before any data field is read,
//! so a malformed-but-"successful" response can never be misinterpreted as
//! data. Warnings are telemetered and tolerated; errors are fatal.

use serde_json::{Map, Value};

use crate::error::{WatchlinkError, WatchlinkResult};
use crate::events::{TelemetryEvent, TelemetrySink};

/// Parse one response line into a JSON object.
pub fn parse_response(raw: &str) -> WatchlinkResult<Map<String, Value>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| WatchlinkError::MalformedResponse {
            detail: format!("invalid JSON: {e}"),
            raw: raw.to_string(),
        })?;

    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(WatchlinkError::MalformedResponse {
            detail: "response is not a JSON object".to_string(),
            raw: other.to_string(),
        }),
    }
}

/// Inspect a parsed response for service-reported conditions.
///
/// Runs before any field extraction: a `warning` is emitted to telemetry and
/// tolerated; an `error` is emitted and raised with the service's message.
pub fn validate(obj: &Map<String, Value>, sink: &dyn TelemetrySink) -> WatchlinkResult<()> {
    if let Some(warning) = obj.get("warning").and_then(Value::as_str) {
        sink.on_event(TelemetryEvent::ServiceWarning {
            message: warning.to_string(),
        });
    }

    if let Some(error) = obj.get("error").and_then(Value::as_str) {
        sink.on_event(TelemetryEvent::ServiceError {
            message: error.to_string(),
        });
        return Err(WatchlinkError::Protocol {
            message: error.to_string(),
        });
    }

    Ok(())
}

/// Extract a required string field.
pub fn expect_str(obj: &Map<String, Value>, field: &str) -> WatchlinkResult<String> {
    obj.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| WatchlinkError::MalformedResponse {
            detail: format!("missing string field '{field}'"),
            raw: Value::Object(obj.clone()).to_string(),
        })
}

/// Extract an optional string field.
pub fn optional_str(obj: &Map<String, Value>, field: &str) -> Option<String> {
    obj.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Extract the `files` array of relative names.
///
/// A missing key is tolerated as empty: subscription acks carry no `files`.
pub fn file_names(obj: &Map<String, Value>) -> WatchlinkResult<Vec<String>> {
    let Some(files) = obj.get("files") else {
        return Ok(Vec::new());
    };

    let entries = files
        .as_array()
        .ok_or_else(|| WatchlinkError::MalformedResponse {
            detail: "'files' is not an array".to_string(),
            raw: files.to_string(),
        })?;

    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| WatchlinkError::MalformedResponse {
                    detail: "'files' entry is not a string".to_string(),
                    raw: entry.to_string(),
                })
        })
        .collect()
}
