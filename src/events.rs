//! Telemetry sink port
//!
//! Provides an observable interface for protocol events: service warnings,
//! service errors, read timeouts, and crash markers. The protocol core only
//! ever talks to the trait, never to a concrete sink.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

/// Event emitted during protocol operations
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// The service attached a non-fatal `warning` field to a response
    ServiceWarning { message: String },

    /// The service reported a fatal `error` field
    ServiceError { message: String },

    /// A bounded read ran out of budget on an explicit call
    ReadTimeout { operation: String, timeout_ms: u64 },

    /// A crash marker was written for a failing root
    CrashMarkerWritten { root: PathBuf, marker: PathBuf },

    /// A wrapped protocol operation failed and is being escalated
    OperationFailed { message: String },
}

/// Trait for receiving telemetry events
///
/// Implementations can be:
/// - JsonTelemetrySink: NDJSON event stream for CI/automation
/// - NoopTelemetrySink: silent operation
pub trait TelemetrySink: Send + Sync {
    /// Handle a telemetry event
    fn on_event(&self, event: TelemetryEvent);
}

/// No-op sink for silent operation
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn on_event(&self, _event: TelemetryEvent) {
        // Do nothing
    }
}

/// Sink that outputs NDJSON events
pub struct JsonTelemetrySink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonTelemetrySink {
    /// Create a new NDJSON sink writing to stderr
    pub fn stderr() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stderr())),
        }
    }

    /// Create an NDJSON sink writing to a custom writer (for testing)
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl TelemetrySink for JsonTelemetrySink {
    fn on_event(&self, event: TelemetryEvent) {
        let json = serde_json::to_value(&event).unwrap_or_else(|_| serde_json::json!({}));
        self.write_event(json);
    }
}
