//! Change tracking: one-shot since-queries and the subscription feed
//!
//! Both delivery modes sit behind `get_changes`, which always returns a set
//! of changed absolute paths and always leaves the session's clock at least
//! as fresh as it found it.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Map;

use super::{Session, DEFAULT_TIMEOUT};
use crate::error::WatchlinkResult;
use crate::query;
use crate::response::{expect_str, file_names, optional_str, parse_response, validate};
use crate::transport::Transport;

/// Outcome of one change poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangePoll {
    /// The service reported changed files since the previous clock
    Update {
        clock: String,
        files: HashSet<PathBuf>,
    },
    /// Nothing pending; the clock was still re-derived so callers always
    /// observe a fresh one
    NoUpdate { clock: String },
}

impl<T: Transport> Session<T> {
    /// Fetch every interesting file currently present under the root.
    ///
    /// Establishes the baseline for later incremental calls; calling it again
    /// re-baselines. Updates the clock from the response.
    pub fn get_all_files(&mut self) -> WatchlinkResult<Vec<PathBuf>> {
        let request = query::all_files_query(
            &self.watch_root.display().to_string(),
            &self.relative_path.display().to_string(),
            &self.filter,
        );
        let response = self.exec("query", &request, DEFAULT_TIMEOUT)?;

        let clock = expect_str(&response, "clock")?;
        let files = self.absolute_files(&response)?;
        self.clock = clock;
        Ok(files)
    }

    /// Report files changed since the last observation, as absolute paths.
    ///
    /// Uniform wrapper over `poll_changes`: a quiet poll is an empty set, not
    /// an error.
    pub fn get_changes(&mut self) -> WatchlinkResult<HashSet<PathBuf>> {
        match self.poll_changes()? {
            ChangePoll::Update { files, .. } => Ok(files),
            ChangePoll::NoUpdate { .. } => Ok(HashSet::new()),
        }
    }

    /// One poll of the change-tracking protocol, as a tagged result.
    ///
    /// Non-subscribing sessions issue a since-query bounded by the default
    /// timeout. Subscribing sessions take a non-blocking look at the feed; an
    /// empty feed is the expected steady state and re-derives the clock with
    /// a fresh `clock` call rather than trusting the stored value.
    pub fn poll_changes(&mut self) -> WatchlinkResult<ChangePoll> {
        if self.subscribe {
            self.poll_subscription()
        } else {
            self.poll_since_query()
        }
    }

    fn poll_since_query(&mut self) -> WatchlinkResult<ChangePoll> {
        let request = query::since_query(
            &self.watch_root.display().to_string(),
            &self.relative_path.display().to_string(),
            &self.filter,
            &self.clock,
        );
        let response = self.exec("query", &request, DEFAULT_TIMEOUT)?;

        let clock = expect_str(&response, "clock")?;
        let files = self.absolute_files(&response)?;
        self.clock = clock.clone();
        Ok(ChangePoll::Update {
            clock,
            files: files.into_iter().collect(),
        })
    }

    fn poll_subscription(&mut self) -> WatchlinkResult<ChangePoll> {
        match self.transport.read_line(Duration::ZERO)? {
            Some(line) => {
                let response = parse_response(&line)?;
                let sink = std::sync::Arc::clone(&self.sink);
                validate(&response, sink.as_ref())?;

                // The subscribe ack carries neither clock nor files; it
                // degrades to an empty update at the current clock.
                let files = self.absolute_files(&response)?;
                if let Some(clock) = optional_str(&response, "clock") {
                    self.clock = clock;
                }
                Ok(ChangePoll::Update {
                    clock: self.clock.clone(),
                    files: files.into_iter().collect(),
                })
            }
            None => {
                let request = query::clock(&self.watch_root.display().to_string());
                let response = self.exec("clock", &request, DEFAULT_TIMEOUT)?;
                let clock = expect_str(&response, "clock")?;
                self.clock = clock.clone();
                Ok(ChangePoll::NoUpdate { clock })
            }
        }
    }

    /// Join each returned relative name onto `watch_root/relative_path`.
    ///
    /// The protocol never returns absolute paths itself.
    fn absolute_files(
        &self,
        response: &Map<String, serde_json::Value>,
    ) -> WatchlinkResult<Vec<PathBuf>> {
        let base = self.watch_root.join(&self.relative_path);
        Ok(file_names(response)?
            .into_iter()
            .map(|name| base.join(name))
            .collect())
    }
}
