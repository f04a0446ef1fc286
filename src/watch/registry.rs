//! Watch-list business rules: capacity, toggle semantics, entry lifecycle

use super::entry::{UserId, WatchEntry, WatchMap};
use super::store::WatchStore;
use crate::catalog::{CourseQuery, SectionSnapshot};
use anyhow::Result;
use std::sync::Mutex;
use tracing::info;

/// Outcome of an add-or-toggle request. These are normal results, not
/// errors; each maps to a distinct user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// User added as a watcher (entry created if absent)
    Added { title: String },
    /// User was already watching; the watch was toggled off
    RemovedDuplicate,
    /// User is at the configured watch capacity; nothing changed
    CapacityExceeded,
    /// The section already has open seats; watching it is meaningless
    AlreadyOpen,
}

impl WatchOutcome {
    pub fn user_message(&self) -> String {
        match self {
            WatchOutcome::Added { title } => {
                format!("Course '{}' added to the watch list.", title)
            }
            WatchOutcome::RemovedDuplicate => "Removed course from the watch list.".to_string(),
            WatchOutcome::CapacityExceeded => "You are watching too many courses.".to_string(),
            WatchOutcome::AlreadyOpen => "CRN is currently open.".to_string(),
        }
    }
}

/// The only writer of the watch store.
///
/// All operations serialize on one mutex, so the non-empty-watchers and
/// capacity invariants hold under concurrent requests, and the poller's
/// `all_entries` snapshot never observes a half-applied mutation. Every
/// mutation persists the full map before returning.
pub struct WatchRegistry {
    entries: Mutex<WatchMap>,
    store: WatchStore,
    capacity: usize,
}

impl WatchRegistry {
    /// Load existing state from the store
    pub fn open(store: WatchStore, capacity: usize) -> Result<Self> {
        let entries = store.load()?;
        Ok(Self {
            entries: Mutex::new(entries),
            store,
            capacity,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WatchMap> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn count_for(map: &WatchMap, user: &str) -> usize {
        map.values().filter(|entry| entry.has_watcher(user)).count()
    }

    /// Add the user as a watcher of the snapshot's section, or toggle the
    /// watch off if they already have one. The open check uses the snapshot
    /// the caller fetched at request time.
    pub fn add_or_toggle(
        &self,
        user: &str,
        snapshot: &SectionSnapshot,
        query: &CourseQuery,
    ) -> Result<WatchOutcome> {
        if snapshot.status.is_open() {
            return Ok(WatchOutcome::AlreadyOpen);
        }

        let mut map = self.lock();

        if let Some(entry) = map.get_mut(&snapshot.crn) {
            if entry.remove_watcher(user) {
                if entry.watchers.is_empty() {
                    map.remove(&snapshot.crn);
                }
                self.store.save(&map)?;
                info!(crn = %snapshot.crn, %user, "Watch toggled off");
                return Ok(WatchOutcome::RemovedDuplicate);
            }
        }

        if Self::count_for(&map, user) >= self.capacity {
            return Ok(WatchOutcome::CapacityExceeded);
        }

        let entry = map.entry(snapshot.crn.clone()).or_insert_with(|| {
            WatchEntry::new(snapshot.crn.clone(), snapshot.title.clone(), query.clone())
        });
        entry.add_watcher(user);
        self.store.save(&map)?;
        info!(crn = %snapshot.crn, %user, "Watch added");

        Ok(WatchOutcome::Added {
            title: snapshot.title.clone(),
        })
    }

    /// Titles and CRNs the user is watching, in key order
    pub fn list_watches(&self, user: &str) -> Vec<(String, String)> {
        self.lock()
            .values()
            .filter(|entry| entry.has_watcher(user))
            .map(|entry| (entry.title.clone(), entry.crn.clone()))
            .collect()
    }

    pub fn watch_count(&self, user: &str) -> usize {
        Self::count_for(&self.lock(), user)
    }

    /// Remove an entry outright, returning the watchers that were attached.
    /// Idempotent: an unknown CRN returns an empty list.
    pub fn remove_entry(&self, crn: &str) -> Result<Vec<UserId>> {
        let mut map = self.lock();
        match map.remove(crn) {
            Some(entry) => {
                self.store.save(&map)?;
                info!(%crn, watchers = entry.watchers.len(), "Watch entry removed");
                Ok(entry.watchers)
            }
            None => Ok(Vec::new()),
        }
    }

    /// Cloned snapshot of all entries for one poll cycle
    pub fn all_entries(&self) -> Vec<WatchEntry> {
        self.lock().values().cloned().collect()
    }
}
