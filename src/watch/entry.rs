//! Watch entry: one watched section and its interested users

use crate::catalog::CourseQuery;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque user identifier, resolved to a delivery target by the notifier
pub type UserId = String;

/// Full watch-list state, keyed by CRN
pub type WatchMap = BTreeMap<String, WatchEntry>;

/// One watched section.
///
/// The title is captured at creation so it stays displayable even when later
/// fetches fail. The query holds the original fetch parameters for the
/// poller. An entry with no watchers must not exist; the registry deletes it
/// when the last watcher leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub crn: String,
    pub title: String,
    pub watchers: Vec<UserId>,
    pub query: CourseQuery,
    pub created_at: DateTime<Utc>,
}

impl WatchEntry {
    pub fn new(crn: impl Into<String>, title: impl Into<String>, query: CourseQuery) -> Self {
        Self {
            crn: crn.into(),
            title: title.into(),
            watchers: Vec::new(),
            query,
            created_at: Utc::now(),
        }
    }

    pub fn has_watcher(&self, user: &str) -> bool {
        self.watchers.iter().any(|w| w == user)
    }

    /// Add a watcher, keeping insertion order and uniqueness
    pub fn add_watcher(&mut self, user: &str) {
        if !self.has_watcher(user) {
            self.watchers.push(user.to_string());
        }
    }

    /// Remove a watcher; returns true when the watcher was present
    pub fn remove_watcher(&mut self, user: &str) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|w| w != user);
        self.watchers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> WatchEntry {
        let query = CourseQuery::section("CS", "225", "31187").unwrap();
        WatchEntry::new("31187", "CS 225: Data Structures", query)
    }

    #[test]
    fn test_add_watcher_is_idempotent() {
        let mut entry = entry();
        entry.add_watcher("alice");
        entry.add_watcher("alice");
        entry.add_watcher("bob");
        assert_eq!(entry.watchers, vec!["alice".to_string(), "bob".to_string()]);
    }

    #[test]
    fn test_remove_watcher_reports_presence() {
        let mut entry = entry();
        entry.add_watcher("alice");
        assert!(entry.remove_watcher("alice"));
        assert!(!entry.remove_watcher("alice"));
        assert!(entry.watchers.is_empty());
    }

    #[test]
    fn test_entry_serde_round_trip() {
        let mut entry = entry();
        entry.add_watcher("alice");
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: WatchEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
