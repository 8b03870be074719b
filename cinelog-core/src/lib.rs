//! Domain library for the cinelog movie catalog.
//!
//! The interesting pieces are [`filename::FilenameParser`], which infers a
//! (title, year) pair from release-style video filenames, and
//! [`merge::apply_metadata`], which reconciles a catalog record with a
//! fetched metadata payload under an explicit overwrite policy. Around
//! them sit the filesystem scanner, the metadata providers, and the
//! catalog store/service that wire everything together.

pub mod error;
pub mod filename;
pub mod library;
pub mod merge;
pub mod providers;
pub mod scanner;

pub use error::{CatalogError, Result};
pub use filename::{FilenameParser, TitleGuess};
pub use library::{
    CatalogService, CsvImportOptions, ImportReport, JsonStore, MovieEdit, MovieStore, ScanReport,
    SweepReport,
};
pub use merge::apply_metadata;
pub use providers::{MetadataSource, OmdbProvider, ProviderError, RatingsSource, TmdbProvider};
pub use scanner::{MediaScanner, ScanOutcome, ScannedFile};
