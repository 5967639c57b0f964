//! Failure escalation guards
//!
//! Any failure inside a wrapped protocol operation leaves a durable zero-byte
//! marker file keyed by the watched root, so operators can detect "watcher
//! died for this root" even if the consumer process never gets to clean up.
//! Three flavors: re-raise (library use), terminate the process (strict use),
//! and swallow-to-`None` (optional init with a non-watched fallback).

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::WatchlinkResult;
use crate::events::{TelemetryEvent, TelemetrySink};

/// Deterministic marker path for a watched root, under the shared temp dir.
pub fn marker_path(root: &Path) -> PathBuf {
    let escaped = escape_root(&root.display().to_string());
    std::env::temp_dir().join(format!("{escaped}.watchlink_died"))
}

/// Escape a root path into a flat file name.
///
/// `/` maps to `zS`, `z` to `zZ`, and any other character outside
/// `[A-Za-z0-9._-]` to `zXX` per UTF-8 byte, so distinct roots always keep
/// distinct names. Hex digits are uppercase and never collide with the `S`
/// and `Z` escapes.
pub(crate) fn escape_root(root: &str) -> String {
    let mut out = String::with_capacity(root.len());
    for c in root.chars() {
        match c {
            '/' => out.push_str("zS"),
            'z' => out.push_str("zZ"),
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("z{byte:02X}"));
                }
            }
        }
    }
    out
}

fn mark_failed(root: &Path, sink: &dyn TelemetrySink) {
    let marker = marker_path(root);
    match fs::write(&marker, b"") {
        Ok(()) => sink.on_event(TelemetryEvent::CrashMarkerWritten {
            root: root.to_path_buf(),
            marker,
        }),
        // The marker is the external death signal; its loss must not be
        // silent.
        Err(err) => sink.on_event(TelemetryEvent::OperationFailed {
            message: format!("failed to write crash marker {}: {err}", marker.display()),
        }),
    }
}

/// Run `f`, writing the crash marker for `root` before re-raising any error.
pub fn with_crash_marker<T>(
    root: &Path,
    sink: &dyn TelemetrySink,
    f: impl FnOnce() -> WatchlinkResult<T>,
) -> WatchlinkResult<T> {
    match f() {
        Ok(value) => Ok(value),
        Err(err) => {
            mark_failed(root, sink);
            sink.on_event(TelemetryEvent::OperationFailed {
                message: err.to_string(),
            });
            Err(err)
        }
    }
}

/// Run `f`, writing the crash marker and terminating the process on error.
///
/// For top-level consumers that cannot proceed without a working watch.
pub fn with_crash_marker_exit<T>(
    root: &Path,
    sink: &dyn TelemetrySink,
    f: impl FnOnce() -> WatchlinkResult<T>,
) -> T {
    match f() {
        Ok(value) => value,
        Err(err) => {
            mark_failed(root, sink);
            sink.on_event(TelemetryEvent::OperationFailed {
                message: err.to_string(),
            });
            std::process::exit(1);
        }
    }
}

/// Run `f`, writing the crash marker and swallowing the error to `None`.
///
/// For optional initialization where the caller has a fallback strategy.
pub fn with_crash_marker_opt<T>(
    root: &Path,
    sink: &dyn TelemetrySink,
    f: impl FnOnce() -> WatchlinkResult<T>,
) -> Option<T> {
    match f() {
        Ok(value) => Some(value),
        Err(err) => {
            mark_failed(root, sink);
            sink.on_event(TelemetryEvent::OperationFailed {
                message: err.to_string(),
            });
            None
        }
    }
}
