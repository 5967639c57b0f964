//! Interesting-file predicate data
//!
//! The service-side query expression is assembled from this data rather than
//! hard-coded, so deployments can adjust which files count as interesting
//! without touching protocol logic.

/// Which files the watch considers interesting.
///
/// The default set matches ordinary files whose name is the config-file
/// sentinel or whose suffix is in the extension set, excluding anything under
/// a VCS metadata directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    /// File name always matched regardless of suffix (the project config
    /// sentinel)
    pub sentinel: String,
    /// Matched file suffixes, without the leading dot
    pub suffixes: Vec<String>,
    /// Directory names whose subtrees are excluded
    pub vcs_dirs: Vec<String>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            sentinel: ".hhconfig".to_string(),
            // TODO: "php" pulls in every plain PHP script, not just checked
            // sources; deployments that only check Hack files should drop it.
            suffixes: vec![
                "php".to_string(),
                "phpt".to_string(),
                "hack".to_string(),
                "hackpartial".to_string(),
                "hck".to_string(),
                "hh".to_string(),
                "hhi".to_string(),
                "xhp".to_string(),
            ],
            vcs_dirs: vec![".hg".to_string(), ".git".to_string(), ".svn".to_string()],
        }
    }
}
