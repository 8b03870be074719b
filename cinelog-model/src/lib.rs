//! Shared data models for the cinelog movie catalog.
//!
//! Everything here is plain data: the catalog record, the ephemeral
//! provider payload, the changed-field vocabulary used for partial
//! updates, and the filter/sort/pagination types consumed by stores.

pub mod fields;
pub mod filters;
pub mod movie;
pub mod payload;

pub use fields::MovieField;
pub use filters::{MovieFilter, MovieSort, MovieSortField, Page, SortDirection};
pub use movie::MovieRecord;
pub use payload::MetadataPayload;
