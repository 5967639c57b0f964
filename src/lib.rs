//! Watchlink - client for a local file-watching service
//!
//! Watchlink lets a consumer (a type-checker, build tool, or indexer)
//! discover the interesting files under a project root and then receive
//! incremental change notifications, speaking newline-delimited JSON to a
//! watching service over a Unix domain socket. It covers the session layer
//! only: query construction, bounded-time transport, the logical clock, and
//! failure escalation. The watching daemon itself is an external service.

pub mod error;
pub mod escalation;
pub mod events;
pub mod filter;
pub mod query;
pub mod response;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use error::{WatchlinkError, WatchlinkResult};
pub use escalation::{marker_path, with_crash_marker, with_crash_marker_exit, with_crash_marker_opt};
pub use events::{JsonTelemetrySink, NoopTelemetrySink, TelemetryEvent, TelemetrySink};
pub use filter::FilterSpec;
pub use session::{ChangePoll, Session, SessionOptions, DEFAULT_TIMEOUT};
pub use transport::{AddressSource, FixedAddress, Transport, UnixSocketTransport};
