//! Shared test support for the integration suites

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use watchlink::{Transport, WatchlinkResult};

/// Transport that records sent requests and replays canned read results.
///
/// A scripted `None` stands for a deadline that passed with no line; an
/// exhausted script reads the same way.
pub struct ScriptedTransport {
    sent: Arc<Mutex<Vec<Value>>>,
    reads: VecDeque<Option<String>>,
}

impl ScriptedTransport {
    pub fn new(reads: Vec<Option<String>>) -> (Self, Arc<Mutex<Vec<Value>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                sent: sent.clone(),
                reads: reads.into_iter().collect(),
            },
            sent,
        )
    }
}

impl Transport for ScriptedTransport {
    fn send(&mut self, request: &Value) -> WatchlinkResult<()> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(())
    }

    fn read_line(&mut self, _timeout: Duration) -> WatchlinkResult<Option<String>> {
        Ok(self.reads.pop_front().flatten())
    }
}

/// Canned handshake responses: version ack, watch-project ack, clock seed.
pub fn handshake(watch: &str, relative: Option<&str>, clock: &str) -> Vec<Option<String>> {
    let mut watch_ack = serde_json::json!({ "watch": watch });
    if let Some(rel) = relative {
        watch_ack["relative_path"] = rel.into();
    }
    vec![
        Some(r#"{"version":"4.9"}"#.to_string()),
        Some(watch_ack.to_string()),
        Some(serde_json::json!({ "clock": clock }).to_string()),
    ]
}
