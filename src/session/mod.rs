//! Watch session: identity, logical clock, and the change-tracking protocol
//!
//! A session owns its transport exclusively and carries exactly one piece of
//! mutable state, the logical clock. Every successful round trip that returns
//! a new clock replaces it; it never rolls back. Consumers needing concurrent
//! watches create independent sessions.

mod bootstrap;
mod changes;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::{WatchlinkError, WatchlinkResult};
use crate::events::{TelemetryEvent, TelemetrySink};
use crate::filter::FilterSpec;
use crate::response::{parse_response, validate};
use crate::transport::Transport;

pub use changes::ChangePoll;

/// Default budget for explicit request/response round trips
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Session creation options
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Use a standing subscription instead of one-shot since-queries
    pub subscribe: bool,
    /// Budget for each handshake round trip
    pub timeout: Duration,
    /// Which files count as interesting
    pub filter: FilterSpec,
    /// Event classes the service should buffer rather than deliver live
    pub defer: Vec<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            subscribe: false,
            timeout: DEFAULT_TIMEOUT,
            filter: FilterSpec::default(),
            defer: vec!["hg.update".to_string()],
        }
    }
}

/// A live watch on one project root
pub struct Session<T: Transport> {
    transport: T,
    sink: Arc<dyn TelemetrySink>,
    /// The root the caller asked to watch; public identity of the session
    root_path: PathBuf,
    /// The root as canonicalized by the service (repo-root detection may
    /// widen it)
    watch_root: PathBuf,
    /// Offset from `watch_root` down to `root_path`; empty when they coincide
    relative_path: PathBuf,
    /// Last point in the service's change history this session observed
    clock: String,
    subscribe: bool,
    filter: FilterSpec,
}

impl<T: Transport> Session<T> {
    /// The root the caller asked to watch.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// The root the service actually watches.
    pub fn watch_root(&self) -> &Path {
        &self.watch_root
    }

    /// Current logical clock token.
    pub fn clock(&self) -> &str {
        &self.clock
    }

    /// Whether this session consumes a standing subscription feed.
    pub fn subscribe_mode(&self) -> bool {
        self.subscribe
    }

    /// One synchronous round trip: send, bounded read, parse, validate.
    ///
    /// The single operation almost everything else calls. A deadline with no
    /// response line is telemetered and raised as a timeout.
    fn exec(
        &mut self,
        operation: &str,
        request: &Value,
        timeout: Duration,
    ) -> WatchlinkResult<Map<String, Value>> {
        let sink = Arc::clone(&self.sink);
        exec_request(&mut self.transport, sink.as_ref(), operation, request, timeout)
    }
}

/// Round-trip helper usable before a `Session` exists (bootstrap).
pub(crate) fn exec_request<T: Transport>(
    transport: &mut T,
    sink: &dyn TelemetrySink,
    operation: &str,
    request: &Value,
    timeout: Duration,
) -> WatchlinkResult<Map<String, Value>> {
    transport.send(request)?;

    match transport.read_line(timeout)? {
        Some(line) => {
            let obj = parse_response(&line)?;
            validate(&obj, sink)?;
            Ok(obj)
        }
        None => {
            let timeout_ms = timeout.as_millis() as u64;
            sink.on_event(TelemetryEvent::ReadTimeout {
                operation: operation.to_string(),
                timeout_ms,
            });
            Err(WatchlinkError::Timeout {
                operation: operation.to_string(),
                timeout_ms,
            })
        }
    }
}
