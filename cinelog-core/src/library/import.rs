use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::library::service::CatalogService;
use crate::merge::apply_metadata;
use cinelog_model::MovieRecord;

/// Header names recognized as the title column, checked case-insensitively.
const TITLE_HEADERS: &[&str] = &["title", "titolo", "film"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvImportOptions {
    /// Mark every imported record as already watched.
    pub watched: bool,
    /// Create bare title records without querying the metadata provider.
    pub titles_only: bool,
}

/// Outcome of a CSV import. Skips carry the 1-based row number and a
/// human-readable reason.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<(usize, String)>,
}

impl CatalogService {
    /// Bulk-import titles from a CSV file, one movie per row.
    ///
    /// The title column is found by header name (any of `title`,
    /// `titolo`, `film`); files without a recognizable header fall back
    /// to the first column. Unless `titles_only` is set, each new title
    /// is looked up against the metadata provider and rows the provider
    /// cannot resolve to a dated movie are skipped rather than imported
    /// half-empty.
    pub async fn import_csv<P: AsRef<Path>>(
        &self,
        path: P,
        options: CsvImportOptions,
    ) -> Result<ImportReport> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path.as_ref())?;

        let title_col = title_column(reader.headers()?);
        let mut report = ImportReport::default();
        let mut seen: HashSet<String> = HashSet::new();

        // Row 1 is the header; data rows start at 2.
        for (index, row) in reader.records().enumerate() {
            let row_number = index + 2;
            let row = row?;

            let Some(title) = row.get(title_col).map(str::trim).filter(|t| !t.is_empty())
            else {
                report
                    .skipped
                    .push((row_number, "missing title".to_string()));
                continue;
            };

            let key = title.to_lowercase();
            if !seen.insert(key) {
                report
                    .skipped
                    .push((row_number, "duplicate row".to_string()));
                continue;
            }
            if self.store().find_by_title(title).await?.is_some() {
                report
                    .skipped
                    .push((row_number, "already in catalog".to_string()));
                continue;
            }

            let mut record = MovieRecord::with_title(title);
            record.watched = options.watched;

            if !options.titles_only
                && let Some(source) = self.metadata_if_configured()
            {
                let payload = match source.search(title, None).await {
                    Ok(Some(payload)) => payload,
                    Ok(None) => {
                        report
                            .skipped
                            .push((row_number, "no metadata found".to_string()));
                        continue;
                    }
                    Err(e) => {
                        warn!("{}: {} lookup failed: {}", title, source.name(), e);
                        report.skipped.push((row_number, e.to_string()));
                        continue;
                    }
                };
                if payload.year.is_none() {
                    report
                        .skipped
                        .push((row_number, "metadata has no release year".to_string()));
                    continue;
                }
                apply_metadata(&mut record, &payload, false);
            }

            self.store().insert(record).await?;
            report.imported += 1;
        }

        info!(
            "Import finished: {} created, {} skipped",
            report.imported,
            report.skipped.len()
        );
        Ok(report)
    }
}

fn title_column(headers: &csv::StringRecord) -> usize {
    headers
        .iter()
        .position(|h| TITLE_HEADERS.contains(&h.trim().to_lowercase().as_str()))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::store::{JsonStore, MovieStore};
    use crate::providers::{MockMetadataSource, ProviderError};
    use cinelog_model::MetadataPayload;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn dated_payload(year: u16) -> MetadataPayload {
        MetadataPayload {
            year: Some(year),
            overview: Some("imported".to_string()),
            ..MetadataPayload::default()
        }
    }

    #[tokio::test]
    async fn titles_only_import_skips_blanks_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(
            &dir,
            "films.csv",
            "Titolo,Note\nCheri,good\n,empty row\nBrazil,\ncheri,again\n",
        );

        let store = Arc::new(JsonStore::in_memory());
        let service = CatalogService::new(store.clone());

        let report = service
            .import_csv(
                &csv,
                CsvImportOptions {
                    watched: true,
                    titles_only: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0], (3, "missing title".to_string()));
        assert_eq!(report.skipped[1], (5, "duplicate row".to_string()));

        let cheri = store.find_by_title("Cheri").await.unwrap().unwrap();
        assert!(cheri.watched);
        assert!(cheri.overview.is_none());
    }

    #[tokio::test]
    async fn headerless_first_column_is_used() {
        let dir = TempDir::new().unwrap();
        // No recognized header; the first row is consumed as one, so
        // data rows follow it like in a plain title list.
        let csv = write_csv(&dir, "films.csv", "Movies\nAlien\nBrazil\n");

        let store = Arc::new(JsonStore::in_memory());
        let service = CatalogService::new(store.clone());

        let report = service
            .import_csv(
                &csv,
                CsvImportOptions {
                    watched: false,
                    titles_only: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(report.imported, 2);
        assert!(store.find_by_title("Alien").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn full_import_enriches_and_skips_unresolved() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(&dir, "films.csv", "title\nCheri\nUnknown Film\nFlaky\n");

        let mut source = MockMetadataSource::new();
        source
            .expect_search()
            .withf(|title, _| title == "Cheri")
            .returning(|_, _| Ok(Some(dated_payload(2009))));
        source
            .expect_search()
            .withf(|title, _| title == "Unknown Film")
            .returning(|_, _| Ok(None));
        source
            .expect_search()
            .withf(|title, _| title == "Flaky")
            .returning(|_, _| Err(ProviderError::RateLimited));
        source.expect_name().return_const("mock");

        let store = Arc::new(JsonStore::in_memory());
        let service =
            CatalogService::new(store.clone()).with_metadata_source(Arc::new(source));

        let report = service
            .import_csv(&csv, CsvImportOptions::default())
            .await
            .unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped.len(), 2);

        let cheri = store.find_by_title("Cheri").await.unwrap().unwrap();
        assert_eq!(cheri.year, Some(2009));
        assert_eq!(cheri.overview.as_deref(), Some("imported"));
    }

    #[tokio::test]
    async fn rows_without_release_year_are_skipped() {
        let dir = TempDir::new().unwrap();
        let csv = write_csv(&dir, "films.csv", "title\nUndated\n");

        let mut source = MockMetadataSource::new();
        source.expect_search().returning(|_, _| {
            Ok(Some(MetadataPayload {
                overview: Some("no year though".to_string()),
                ..MetadataPayload::default()
            }))
        });
        source.expect_name().return_const("mock");

        let store = Arc::new(JsonStore::in_memory());
        let service =
            CatalogService::new(store.clone()).with_metadata_source(Arc::new(source));

        let report = service
            .import_csv(&csv, CsvImportOptions::default())
            .await
            .unwrap();

        assert_eq!(report.imported, 0);
        assert_eq!(
            report.skipped,
            vec![(2, "metadata has no release year".to_string())]
        );
    }
}
