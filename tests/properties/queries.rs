//! Property tests for the query builders.

use proptest::prelude::*;
use watchlink::query;
use watchlink::FilterSpec;

fn token() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9._/-]{0,24}").unwrap()
}

fn filter_spec() -> impl Strategy<Value = FilterSpec> {
    (
        token(),
        proptest::collection::vec(token(), 0..6),
        proptest::collection::vec(token(), 0..4),
    )
        .prop_map(|(sentinel, suffixes, vcs_dirs)| FilterSpec {
            sentinel,
            suffixes,
            vcs_dirs,
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: builders never panic on arbitrary filter data and are
    /// deterministic - identical input yields structurally identical output.
    #[test]
    fn property_builders_are_total_and_deterministic(
        filter in filter_spec(),
        root in token(),
        rel in token(),
        clock in token(),
    ) {
        let all_a = query::all_files_query(&root, &rel, &filter);
        let all_b = query::all_files_query(&root, &rel, &filter);
        prop_assert_eq!(&all_a, &all_b);
        prop_assert!(all_a.is_array());

        let since_a = query::since_query(&root, &rel, &filter, &clock);
        let since_b = query::since_query(&root, &rel, &filter, &clock);
        prop_assert_eq!(&since_a, &since_b);
        prop_assert_eq!(&since_a[2]["since"], &serde_json::json!(clock.as_str()));

        let sub = query::subscribe(&root, &rel, "name", &filter, &clock, &[]);
        prop_assert_eq!(&sub[0], &serde_json::json!("subscribe"));
    }

    /// PROPERTY: the clock is the only thing distinguishing two since-queries
    /// built from the same session state.
    #[test]
    fn property_only_the_clock_varies(
        filter in filter_spec(),
        root in token(),
        rel in token(),
        clock_a in token(),
        clock_b in token(),
    ) {
        let mut a = query::since_query(&root, &rel, &filter, &clock_a);
        let b = query::since_query(&root, &rel, &filter, &clock_b);

        a[2]["since"] = serde_json::json!(clock_b);
        prop_assert_eq!(a, b);
    }
}
