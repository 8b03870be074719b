pub mod import;
pub mod service;
pub mod store;

pub use import::{CsvImportOptions, ImportReport};
pub use service::{CatalogService, MovieEdit, ScanReport, SweepReport};
pub use store::{JsonStore, MovieStore};
