//! Request builders for the watching service
//!
//! Every request is a JSON array with a leading command-name string. Builders
//! are pure: no I/O, and identical input always yields structurally identical
//! output (the incremental shapes embed the caller-supplied clock).

use serde_json::{json, Value};

use crate::filter::FilterSpec;

/// Build a `version` capability check.
///
/// Used once at handshake to confirm the service supports a needed feature.
/// An unsupported capability surfaces as a plain service error.
pub fn capability_check(required: &[&str], optional: &[&str]) -> Value {
    json!(["version", { "required": required, "optional": optional }])
}

/// Build a `watch-project` request establishing (or reusing) a watch.
pub fn watch_project(root: &str) -> Value {
    json!(["watch-project", root])
}

/// Build a `clock` request returning the current logical clock for a root,
/// with no query side effect.
pub fn clock(watch_root: &str) -> Value {
    json!(["clock", watch_root])
}

/// Build the one-shot query for all interesting files currently present.
///
/// Adds an `exists` term so only files present right now are returned.
pub fn all_files_query(watch_root: &str, relative_root: &str, filter: &FilterSpec) -> Value {
    json!(["query", watch_root, {
        "fields": ["name"],
        "relative_root": relative_root,
        "expression": ["allof", ["exists"], base_expression(filter)],
    }])
}

/// Build an incremental query for files changed since `clock_spec`.
pub fn since_query(
    watch_root: &str,
    relative_root: &str,
    filter: &FilterSpec,
    clock_spec: &str,
) -> Value {
    json!(["query", watch_root, {
        "fields": ["name"],
        "relative_root": relative_root,
        "expression": ["allof", base_expression(filter)],
        "since": clock_spec,
    }])
}

/// Build a standing subscription request.
///
/// `defer` names event classes the service should buffer rather than deliver
/// live, so a large VCS update does not flood the channel.
pub fn subscribe(
    watch_root: &str,
    relative_root: &str,
    name: &str,
    filter: &FilterSpec,
    clock_spec: &str,
    defer: &[String],
) -> Value {
    json!(["subscribe", watch_root, name, {
        "fields": ["name"],
        "relative_root": relative_root,
        "expression": ["allof", base_expression(filter)],
        "since": clock_spec,
        "defer": defer,
    }])
}

/// The boolean predicate shared by every query shape: ordinary files whose
/// name is the sentinel or whose suffix is in the filter set, and that do not
/// live under a VCS metadata directory.
fn base_expression(filter: &FilterSpec) -> Value {
    let mut vcs_anyof = vec![json!("anyof")];
    vcs_anyof.extend(filter.vcs_dirs.iter().map(|dir| json!(["dirname", dir])));

    json!(["allof",
        ["type", "f"],
        ["anyof", ["name", &filter.sentinel], ["suffix", &filter.suffixes]],
        ["not", Value::Array(vcs_anyof)],
    ])
}
