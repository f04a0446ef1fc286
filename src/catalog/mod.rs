//! Course explorer access: queries, fetching, and payload decoding

pub mod client;
pub mod format;
pub mod query;
pub mod snapshot;

pub use client::{CatalogClient, FetchError, SectionFetch};
pub use query::{CourseQuery, QueryError};
pub use snapshot::{
    CourseDetail, CourseRef, DepartmentListing, ParseError, SeatStatus, SectionDetails,
    SectionSnapshot,
};
