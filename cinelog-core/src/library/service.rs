use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, Result};
use crate::filename::FilenameParser;
use crate::library::store::MovieStore;
use crate::merge::apply_metadata;
use crate::providers::{MetadataSource, RatingsSource};
use crate::scanner::MediaScanner;
use cinelog_model::{MovieField, MovieFilter, MovieRecord, MovieSort, MovieSortField, Page};

/// Outcome of a folder scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Video files seen on disk, whether or not they were new.
    pub files_found: usize,
    /// Records created for files not yet in the catalog.
    pub records_added: usize,
    pub errors: Vec<String>,
}

/// Outcome of a catalog-wide enrichment sweep.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub checked: usize,
    pub updated: usize,
}

/// Manual corrections to a record. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct MovieEdit {
    pub title: Option<String>,
    pub year: Option<u16>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub codec: Option<String>,
}

impl MovieEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.director.is_none()
            && self.codec.is_none()
    }
}

/// Orchestrates the catalog: scanning folders into records, enriching
/// records from metadata providers, and the browse/CRUD surface the CLI
/// sits on.
///
/// Providers are optional; operations that need one fail with
/// [`CatalogError::Unconfigured`] when it is absent.
pub struct CatalogService {
    store: Arc<dyn MovieStore>,
    metadata: Option<Arc<dyn MetadataSource>>,
    ratings: Option<Arc<dyn RatingsSource>>,
    parser: FilenameParser,
    scanner: MediaScanner,
}

impl CatalogService {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self {
            store,
            metadata: None,
            ratings: None,
            parser: FilenameParser::new(),
            scanner: MediaScanner::new(),
        }
    }

    pub fn with_metadata_source(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.metadata = Some(source);
        self
    }

    pub fn with_ratings_source(mut self, source: Arc<dyn RatingsSource>) -> Self {
        self.ratings = Some(source);
        self
    }

    pub fn with_scanner(mut self, scanner: MediaScanner) -> Self {
        self.scanner = scanner;
        self
    }

    fn metadata_source(&self) -> Result<&Arc<dyn MetadataSource>> {
        self.metadata
            .as_ref()
            .ok_or(CatalogError::Unconfigured("metadata provider"))
    }

    fn ratings_source(&self) -> Result<&Arc<dyn RatingsSource>> {
        self.ratings
            .as_ref()
            .ok_or(CatalogError::Unconfigured("ratings provider"))
    }

    pub(crate) fn store(&self) -> &Arc<dyn MovieStore> {
        &self.store
    }

    pub(crate) fn metadata_if_configured(&self) -> Option<&Arc<dyn MetadataSource>> {
        self.metadata.as_ref()
    }

    /// Walk `root` and create a record for every video file the catalog
    /// does not already track. Known paths are left untouched, so a
    /// rescan never duplicates or resets anything.
    pub async fn scan_folder<P: AsRef<Path>>(&self, root: P) -> Result<ScanReport> {
        let outcome = self.scanner.scan_directory(root)?;

        let mut report = ScanReport {
            files_found: outcome.video_files.len(),
            records_added: 0,
            errors: outcome.errors,
        };

        for file in &outcome.video_files {
            let path = file.path.to_string_lossy().into_owned();
            if self.store.get_by_path(&path).await?.is_some() {
                debug!("Already tracked: {}", path);
                continue;
            }

            let guess = self.parser.guess_title_year(&file.file_name);
            let record = MovieRecord {
                title: guess.title,
                year: guess.year,
                file_path: Some(path),
                file_size_mb: Some(file.size_mb()),
                extension: Some(file.extension.clone()),
                ..MovieRecord::default()
            };

            let id = self.store.insert(record).await?;
            debug!("Added record {} for {}", id, file.file_name);
            report.records_added += 1;
        }

        info!(
            "Scan added {} of {} video files",
            report.records_added, report.files_found
        );
        Ok(report)
    }

    /// Fill-gaps sweep: every record without an overview gets one lookup
    /// against the metadata provider, and only blank fields are written.
    /// Provider misses and failures just leave the record for next time.
    pub async fn fill_missing_metadata(&self) -> Result<SweepReport> {
        let source = self.metadata_source()?.clone();

        let filter = MovieFilter {
            missing_overview: Some(true),
            ..MovieFilter::default()
        };
        let targets = self.list_all(&filter).await?;

        let mut report = SweepReport::default();
        for mut movie in targets {
            report.checked += 1;

            let payload = match source.search(&movie.title, movie.year).await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    debug!("{}: no result from {}", movie.title, source.name());
                    continue;
                }
                Err(e) => {
                    warn!("{}: {} lookup failed: {}", movie.title, source.name(), e);
                    continue;
                }
            };

            let changed = apply_metadata(&mut movie, &payload, false);
            if !changed.is_empty() {
                self.store
                    .update_fields(movie.id, &movie, &changed)
                    .await?;
                report.updated += 1;
            }
        }

        info!(
            "Metadata sweep: {} checked, {} updated",
            report.checked, report.updated
        );
        Ok(report)
    }

    /// Force-refresh one record from the metadata provider, overwriting
    /// whatever the provider has a value for. Returns the fields that
    /// changed, or `None` when the provider had no match.
    pub async fn refresh_movie(&self, id: i64) -> Result<Option<Vec<MovieField>>> {
        let source = self.metadata_source()?.clone();

        let mut movie = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("movie {id}")))?;

        let Some(payload) = source.search(&movie.title, movie.year).await? else {
            warn!("{}: no result from {}", movie.title, source.name());
            return Ok(None);
        };

        let changed = apply_metadata(&mut movie, &payload, true);
        if !changed.is_empty() {
            self.store.update_fields(id, &movie, &changed).await?;
        }
        info!("{}: refreshed {} fields", movie.title, changed.len());
        Ok(Some(changed))
    }

    /// Fill-gaps sweep over the ratings provider: records that carry an
    /// external id but no critic rating yet get one by-id lookup.
    pub async fn fetch_critic_ratings(&self) -> Result<SweepReport> {
        let source = self.ratings_source()?.clone();

        let filter = MovieFilter {
            has_external_id: Some(true),
            missing_critic_rating: Some(true),
            ..MovieFilter::default()
        };
        let targets = self.list_all(&filter).await?;

        let mut report = SweepReport::default();
        for mut movie in targets {
            report.checked += 1;

            let Some(external_id) = movie.external_id.clone() else {
                continue;
            };
            let payload = match source.lookup_by_id(&external_id).await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    debug!("{}: {} has no entry", movie.title, source.name());
                    continue;
                }
                Err(e) => {
                    warn!("{}: {} lookup failed: {}", movie.title, source.name(), e);
                    continue;
                }
            };

            let changed = apply_metadata(&mut movie, &payload, false);
            if !changed.is_empty() {
                self.store
                    .update_fields(movie.id, &movie, &changed)
                    .await?;
                report.updated += 1;
            }
        }

        info!(
            "Ratings sweep: {} checked, {} updated",
            report.checked, report.updated
        );
        Ok(report)
    }

    pub async fn get_movie(&self, id: i64) -> Result<MovieRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("movie {id}")))
    }

    pub async fn list_movies(
        &self,
        filter: &MovieFilter,
        sort: MovieSort,
        page: Page,
    ) -> Result<Vec<MovieRecord>> {
        self.store.list(filter, sort, page).await
    }

    pub async fn count_movies(&self, filter: &MovieFilter) -> Result<usize> {
        self.store.count(filter).await
    }

    pub async fn set_watched(&self, id: i64, watched: bool) -> Result<()> {
        let mut movie = self.get_movie(id).await?;
        movie.watched = watched;
        self.store.update(&movie).await
    }

    pub async fn set_rating(&self, id: i64, rating: Option<f32>) -> Result<()> {
        let mut movie = self.get_movie(id).await?;
        movie.rating = rating;
        self.store.update(&movie).await
    }

    /// Apply manual corrections to a record. Provider sweeps respect
    /// these afterwards since fill-gaps never touches present values.
    pub async fn edit_movie(&self, id: i64, edit: MovieEdit) -> Result<MovieRecord> {
        let mut movie = self.get_movie(id).await?;
        if let Some(title) = edit.title {
            movie.title = title;
        }
        if let Some(year) = edit.year {
            movie.year = Some(year);
        }
        if let Some(genre) = edit.genre {
            movie.genre = Some(genre);
        }
        if let Some(director) = edit.director {
            movie.director = Some(director);
        }
        if let Some(codec) = edit.codec {
            movie.codec = Some(codec);
        }
        self.store.update(&movie).await?;
        Ok(movie)
    }

    /// Pick a random movie among those matching the filter.
    pub async fn random_movie(&self, filter: &MovieFilter) -> Result<Option<MovieRecord>> {
        use rand::seq::IndexedRandom;

        let candidates = self.list_all(filter).await?;
        Ok(candidates.choose(&mut rand::rng()).cloned())
    }

    pub async fn delete_movie(&self, id: i64) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(CatalogError::NotFound(format!("movie {id}")));
        }
        Ok(())
    }

    async fn list_all(&self, filter: &MovieFilter) -> Result<Vec<MovieRecord>> {
        self.store
            .list(
                filter,
                MovieSort::ascending(MovieSortField::Added),
                Page::new(u32::MAX, 0),
            )
            .await
    }
}
