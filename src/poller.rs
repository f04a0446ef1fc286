//! Background polling loop: re-checks watched sections and retires watches
//! on terminal outcomes

use crate::catalog::{FetchError, SeatStatus, SectionFetch, SectionSnapshot};
use crate::notify::{MessageSender, Notifier};
use crate::watch::{WatchEntry, WatchRegistry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Poll loop timing
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Sleep between full passes over the watch list
    pub poll_interval: Duration,
    /// Sleep between per-section fetches within one pass (rate limiting)
    pub fetch_delay: Duration,
    /// Extra sleep after a failed fetch before moving on
    pub error_backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5 * 60),
            fetch_delay: Duration::from_secs(1),
            error_backoff: Duration::from_secs(30),
        }
    }
}

/// What one pass over the watch list did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub checked: usize,
    pub opened: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Drives the watch lifecycle.
///
/// Each cycle takes a snapshot of all entries and evaluates every one:
/// an open section or a 404 is terminal (notify, then retire the watch);
/// a still-closed section is left for the next cycle; transient failures,
/// parse failures, and responses with no enrollment status leave the entry
/// untouched. No single entry's failure aborts the pass.
pub struct Poller<F, S> {
    registry: Arc<WatchRegistry>,
    fetcher: F,
    notifier: Notifier<S>,
    config: PollerConfig,
}

impl<F: SectionFetch, S: MessageSender> Poller<F, S> {
    pub fn new(
        registry: Arc<WatchRegistry>,
        fetcher: F,
        notifier: Notifier<S>,
        config: PollerConfig,
    ) -> Self {
        Self {
            registry,
            fetcher,
            notifier,
            config,
        }
    }

    /// Run until the shutdown signal changes. The signal is honored between
    /// cycles; an in-flight cycle and its notifications always finish.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.config.poll_interval.as_secs(),
            "Course poller started"
        );

        loop {
            let stats = self.run_cycle().await;
            debug!(
                checked = stats.checked,
                opened = stats.opened,
                missing = stats.missing,
                failed = stats.failed,
                "Poll cycle finished"
            );

            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Course poller shutting down");
                    break;
                }
                _ = sleep(self.config.poll_interval) => {}
            }
        }
    }

    /// One pass over the current watch list
    pub async fn run_cycle(&self) -> CycleStats {
        let entries = self.registry.all_entries();
        let mut stats = CycleStats::default();

        for (index, entry) in entries.iter().enumerate() {
            if index > 0 {
                sleep(self.config.fetch_delay).await;
            }
            stats.checked += 1;

            match self.fetcher.fetch_section(&entry.query).await {
                Ok(snapshot) => match snapshot.status {
                    SeatStatus::Unknown => {
                        warn!(crn = %entry.crn, "No enrollment status in catalog response");
                        stats.failed += 1;
                    }
                    status if status.is_open() => {
                        if self.retire_opened(entry, &snapshot).await {
                            stats.opened += 1;
                        } else {
                            stats.failed += 1;
                        }
                    }
                    _ => {}
                },
                Err(FetchError::NotFound) => {
                    if self.retire_missing(entry).await {
                        stats.missing += 1;
                    } else {
                        stats.failed += 1;
                    }
                }
                Err(e) => {
                    warn!(crn = %entry.crn, error = %e, "Failed to check section");
                    stats.failed += 1;
                    sleep(self.config.error_backoff).await;
                }
            }
        }

        stats
    }

    /// Terminal OPENED transition: retire the watch, then notify the
    /// watchers that were attached. Removing first keeps the notification
    /// exactly-once even if a later step fails.
    async fn retire_opened(&self, entry: &WatchEntry, snapshot: &SectionSnapshot) -> bool {
        let watchers = match self.registry.remove_entry(&entry.crn) {
            Ok(watchers) => watchers,
            Err(e) => {
                error!(crn = %entry.crn, error = %e, "Failed to retire opened watch");
                return false;
            }
        };

        let detail = if snapshot.status == SeatStatus::Restricted {
            format!(
                " (Restriction: {})",
                snapshot.restriction.as_deref().unwrap_or("None provided.")
            )
        } else {
            " (No listed restrictions)".to_string()
        };
        let message = format!("{} ({}) is now open{}", entry.title, entry.crn, detail);

        let delivered = self.notifier.notify(&watchers, &message, true).await;
        info!(crn = %entry.crn, delivered, "Section opened, watch retired");
        true
    }

    /// Terminal MISSING transition: the section disappeared from the catalog
    async fn retire_missing(&self, entry: &WatchEntry) -> bool {
        let watchers = match self.registry.remove_entry(&entry.crn) {
            Ok(watchers) => watchers,
            Err(e) => {
                error!(crn = %entry.crn, error = %e, "Failed to retire missing watch");
                return false;
            }
        };

        let message = format!(
            "{} ({}) was not found. It may have been de-listed from the course catalog. \
             Please check whether a section was changed. \
             (You have been removed from the watch list for this course.)",
            entry.title, entry.crn
        );

        let delivered = self.notifier.notify(&watchers, &message, false).await;
        info!(crn = %entry.crn, delivered, "Section missing, watch retired");
        true
    }
}
