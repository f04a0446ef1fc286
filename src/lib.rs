//! Course Seat Monitor - watch course sections and get notified when seats open

pub mod catalog;
pub mod config;
pub mod notify;
pub mod poller;
pub mod watch;

pub use catalog::{
    CatalogClient, CourseDetail, CourseQuery, DepartmentListing, FetchError, QueryError,
    SeatStatus, SectionFetch, SectionSnapshot,
};
pub use config::Config;
pub use notify::{AnySender, ConsoleSender, MessageSender, Notifier, NotifyConfig, WebhookSender};
pub use poller::{CycleStats, Poller, PollerConfig};
pub use watch::{UserId, WatchEntry, WatchOutcome, WatchRegistry, WatchStore};
