//! Property tests for absolute-path reconstruction.

use std::path::PathBuf;
use std::sync::Arc;

use proptest::prelude::*;
use watchlink::{NoopTelemetrySink, Session, SessionOptions, TelemetrySink};

use crate::common::{handshake, ScriptedTransport};

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_-]{1,12}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every returned path is exactly
    /// `watch_root/relative_path/name` - the service only ever reports names
    /// relative to that join.
    #[test]
    fn property_paths_are_watch_root_join_relative_join_name(
        root_segs in proptest::collection::vec(segment(), 1..=3),
        rel in proptest::option::of(segment()),
        name_segs in proptest::collection::vec(segment(), 1..=4),
    ) {
        let watch_root = format!("/{}", root_segs.join("/"));
        let name = name_segs.join("/");

        let mut reads = handshake(&watch_root, rel.as_deref(), "c0");
        reads.push(Some(
            serde_json::json!({ "clock": "c1", "files": [name] }).to_string(),
        ));

        let root_path = match rel.as_deref() {
            Some(r) => format!("{watch_root}/{r}"),
            None => watch_root.clone(),
        };

        let (transport, _sent) = ScriptedTransport::new(reads);
        let mut session = Session::init(
            transport,
            root_path,
            SessionOptions::default(),
            Arc::new(NoopTelemetrySink) as Arc<dyn TelemetrySink>,
        )
        .unwrap();

        let files = session.get_all_files().unwrap();

        let expected = match rel.as_deref() {
            Some(r) => format!("{watch_root}/{r}/{name}"),
            None => format!("{watch_root}/{name}"),
        };
        prop_assert_eq!(files, vec![PathBuf::from(expected)]);
    }
}

#[test]
fn documented_join_example() {
    // watch_root "/repo", relative "sub", name "a/b.php" => "/repo/sub/a/b.php"
    let mut reads = handshake("/repo", Some("sub"), "c0");
    reads.push(Some(
        r#"{"clock":"c1","files":["a/b.php"]}"#.to_string(),
    ));

    let (transport, _sent) = ScriptedTransport::new(reads);
    let mut session = Session::init(
        transport,
        "/repo/sub",
        SessionOptions::default(),
        Arc::new(NoopTelemetrySink) as Arc<dyn TelemetrySink>,
    )
    .unwrap();

    assert_eq!(
        session.get_all_files().unwrap(),
        vec![PathBuf::from("/repo/sub/a/b.php")]
    );
}
