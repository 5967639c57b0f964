//! Transport port - bounded-time line I/O with the watching service
//!
//! The wire protocol is newline-delimited JSON: one request per line, one
//! response per line, plus unsolicited subscription pushes on the same
//! channel. The transport is not reentrant; callers keep at most one
//! request/response pair in flight.

use std::io::{ErrorKind, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::error::{WatchlinkError, WatchlinkResult};

/// Abstract duplex channel to the watching service
///
/// Implementations:
/// - `UnixSocketTransport` - Unix domain socket to a local service
/// - scripted mocks in tests
pub trait Transport {
    /// Serialize `request` to compact JSON, write it with a trailing
    /// newline, and flush. Reads nothing.
    fn send(&mut self, request: &Value) -> WatchlinkResult<()>;

    /// Read one newline-terminated line within `timeout`.
    ///
    /// `Ok(None)` means the deadline passed with no complete line pending; a
    /// zero timeout is the degenerate non-blocking poll. Partial data stays
    /// buffered for the next call. EOF is a transport error.
    fn read_line(&mut self, timeout: Duration) -> WatchlinkResult<Option<String>>;
}

/// How the service's socket address is obtained.
///
/// The usual implementation shells out to a one-shot helper; callers that
/// control service startup can use `FixedAddress` instead. Either way the
/// protocol core never assumes how the address was produced.
pub trait AddressSource {
    /// Yield a connectable socket path within `timeout`.
    fn discover(&self, timeout: Duration) -> WatchlinkResult<PathBuf>;
}

/// Address source for a known socket path
pub struct FixedAddress(pub PathBuf);

impl AddressSource for FixedAddress {
    fn discover(&self, _timeout: Duration) -> WatchlinkResult<PathBuf> {
        Ok(self.0.clone())
    }
}

/// Transport over a Unix domain socket
pub struct UnixSocketTransport {
    stream: UnixStream,
    /// Bytes read past the last returned line
    pending: Vec<u8>,
}

impl UnixSocketTransport {
    /// Connect to the service socket at `path`.
    pub fn connect(path: &Path) -> WatchlinkResult<Self> {
        let stream = UnixStream::connect(path)?;
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already-connected stream.
    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            stream,
            pending: Vec::new(),
        }
    }

    /// Pop the first complete line out of the pending buffer, if any.
    fn take_buffered_line(&mut self) -> WatchlinkResult<Option<String>> {
        let Some(newline) = self.pending.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };

        let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
        line.pop(); // trailing newline
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        String::from_utf8(line)
            .map(Some)
            .map_err(|e| WatchlinkError::MalformedResponse {
                detail: "response line is not UTF-8".to_string(),
                raw: String::from_utf8_lossy(e.as_bytes()).into_owned(),
            })
    }

    /// One non-blocking read into the pending buffer.
    ///
    /// Returns false if no data was available.
    fn fill_nonblocking(&mut self) -> WatchlinkResult<bool> {
        self.stream.set_nonblocking(true)?;
        let mut buf = [0u8; 4096];
        let result = self.stream.read(&mut buf);
        self.stream.set_nonblocking(false)?;

        match result {
            Ok(0) => Err(WatchlinkError::channel_closed()),
            Ok(n) => {
                self.pending.extend_from_slice(&buf[..n]);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// One bounded blocking read into the pending buffer.
    ///
    /// Returns false if the budget expired with no data.
    fn fill_within(&mut self, budget: Duration) -> WatchlinkResult<bool> {
        self.stream.set_read_timeout(Some(budget))?;
        let mut buf = [0u8; 4096];

        match self.stream.read(&mut buf) {
            Ok(0) => Err(WatchlinkError::channel_closed()),
            Ok(n) => {
                self.pending.extend_from_slice(&buf[..n]);
                Ok(true)
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl Transport for UnixSocketTransport {
    fn send(&mut self, request: &Value) -> WatchlinkResult<()> {
        let mut wire = serde_json::to_vec(request)
            .map_err(|e| WatchlinkError::Transport(std::io::Error::other(e.to_string())))?;
        wire.push(b'\n');

        self.stream.write_all(&wire)?;
        self.stream.flush()?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> WatchlinkResult<Option<String>> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(line) = self.take_buffered_line()? {
                return Ok(Some(line));
            }

            if timeout.is_zero() {
                if !self.fill_nonblocking()? {
                    return Ok(None);
                }
                continue;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            if !self.fill_within(remaining)? {
                return Ok(None);
            }
        }
    }
}
