//! Session bootstrap: capability check, watch establishment, clock seeding

use std::path::PathBuf;
use std::sync::Arc;

use super::{exec_request, Session, SessionOptions};
use crate::error::WatchlinkResult;
use crate::escalation::escape_root;
use crate::events::TelemetrySink;
use crate::query;
use crate::response::{expect_str, optional_str};
use crate::transport::{AddressSource, Transport, UnixSocketTransport};

/// Capability the handshake requires: result scoping below the watch root.
const REQUIRED_CAPABILITIES: &[&str] = &["relative_root"];

impl<T: Transport> Session<T> {
    /// Establish a watch session over an already-open transport.
    ///
    /// Handshake order: capability check, `watch-project`, `clock` (seeds the
    /// logical clock), then - in subscribe mode - one fire-and-forget
    /// `subscribe` after which the service starts pushing unsolicited result
    /// objects on the same channel.
    pub fn init(
        transport: T,
        root: impl Into<PathBuf>,
        options: SessionOptions,
        sink: Arc<dyn TelemetrySink>,
    ) -> WatchlinkResult<Self> {
        let mut transport = transport;
        let root_path: PathBuf = root.into();
        let root_str = root_path.display().to_string();

        exec_request(
            &mut transport,
            sink.as_ref(),
            "version",
            &query::capability_check(REQUIRED_CAPABILITIES, &[]),
            options.timeout,
        )?;

        let watch = exec_request(
            &mut transport,
            sink.as_ref(),
            "watch-project",
            &query::watch_project(&root_str),
            options.timeout,
        )?;
        let watch_root = PathBuf::from(expect_str(&watch, "watch")?);
        let relative_path = optional_str(&watch, "relative_path")
            .map(PathBuf::from)
            .unwrap_or_default();

        let watch_root_str = watch_root.display().to_string();
        let seeded = exec_request(
            &mut transport,
            sink.as_ref(),
            "clock",
            &query::clock(&watch_root_str),
            options.timeout,
        )?;
        let clock = expect_str(&seeded, "clock")?;

        let mut session = Self {
            transport,
            sink,
            root_path,
            watch_root,
            relative_path,
            clock,
            subscribe: options.subscribe,
            filter: options.filter,
        };

        if session.subscribe {
            let request = query::subscribe(
                &watch_root_str,
                &session.relative_path.display().to_string(),
                &subscription_name(&session.root_path),
                &session.filter,
                &session.clock,
                &options.defer,
            );
            // Fire-and-forget: the ack arrives later as the first pushed line.
            session.transport.send(&request)?;
        }

        Ok(session)
    }
}

impl Session<UnixSocketTransport> {
    /// Discover the service address, connect, and establish a session.
    pub fn connect(
        source: &dyn AddressSource,
        root: impl Into<PathBuf>,
        options: SessionOptions,
        sink: Arc<dyn TelemetrySink>,
    ) -> WatchlinkResult<Self> {
        let address = source.discover(options.timeout)?;
        let transport = UnixSocketTransport::connect(&address)?;
        Self::init(transport, root, options, sink)
    }
}

/// Subscription name unique per watched root.
fn subscription_name(root: &std::path::Path) -> String {
    format!("watchlink.{}", escape_root(&root.display().to_string()))
}
