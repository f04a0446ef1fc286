//! Watch-list state: entries, persistence, and business rules

pub mod entry;
pub mod registry;
pub mod store;

pub use entry::{UserId, WatchEntry, WatchMap};
pub use registry::{WatchOutcome, WatchRegistry};
pub use store::WatchStore;
