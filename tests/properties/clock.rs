//! Property tests for logical-clock threading.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::json;
use watchlink::{NoopTelemetrySink, Session, SessionOptions, TelemetrySink};

use crate::common::{handshake, ScriptedTransport};

fn clock_token() -> impl Strategy<Value = String> {
    proptest::string::string_regex("c:[a-z0-9]{1,12}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: each since-query resumes from exactly the clock the previous
    /// successful call returned, and the session clock always equals the
    /// latest response's clock. A caller that persists clock N can resume
    /// from it without losing changes.
    #[test]
    fn property_since_queries_thread_the_clock(
        clocks in proptest::collection::vec(clock_token(), 1..8),
    ) {
        let mut reads = handshake("/repo", None, "c:seed");
        for clock in &clocks {
            reads.push(Some(json!({ "clock": clock, "files": [] }).to_string()));
        }

        let (transport, sent) = ScriptedTransport::new(reads);
        let mut session = Session::init(
            transport,
            "/repo",
            SessionOptions::default(),
            Arc::new(NoopTelemetrySink) as Arc<dyn TelemetrySink>,
        )
        .unwrap();
        prop_assert_eq!(session.clock(), "c:seed");

        for (i, clock) in clocks.iter().enumerate() {
            session.get_changes().unwrap();
            prop_assert_eq!(session.clock(), clock.as_str());

            // Handshake occupies the first three requests.
            let requests = sent.lock().unwrap();
            let since = requests[3 + i][2]["since"].as_str().unwrap().to_string();
            drop(requests);

            let expected = if i == 0 { "c:seed" } else { clocks[i - 1].as_str() };
            prop_assert_eq!(since.as_str(), expected);
        }
    }
}
