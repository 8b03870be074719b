use crate::error::Result;
use async_trait::async_trait;
use cinelog_model::{
    MovieField, MovieFilter, MovieRecord, MovieSort, MovieSortField, Page, SortDirection,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

/// Persistence port for the movie catalog, keyed by an integer id.
///
/// The catalog service only ever writes the fields a merge actually
/// changed, hence [`update_fields`](MovieStore::update_fields) next to
/// the full [`update`](MovieStore::update).
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<MovieRecord>>;
    async fn get_by_path(&self, path: &str) -> Result<Option<MovieRecord>>;
    /// Exact title match, case-insensitive. Used by the bulk import to
    /// avoid re-creating titles.
    async fn find_by_title(&self, title: &str) -> Result<Option<MovieRecord>>;
    async fn list(
        &self,
        filter: &MovieFilter,
        sort: MovieSort,
        page: Page,
    ) -> Result<Vec<MovieRecord>>;
    async fn count(&self, filter: &MovieFilter) -> Result<usize>;
    /// Insert a record and return its assigned id.
    async fn insert(&self, record: MovieRecord) -> Result<i64>;
    /// Full-record rewrite, keyed by `record.id`.
    async fn update(&self, record: &MovieRecord) -> Result<()>;
    /// Copy only the named fields of `source` into the stored record.
    async fn update_fields(
        &self,
        id: i64,
        source: &MovieRecord,
        fields: &[MovieField],
    ) -> Result<()>;
    /// Returns whether a record was actually removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

#[derive(Debug, Default)]
struct Inner {
    movies: BTreeMap<i64, MovieRecord>,
    next_id: i64,
}

/// In-memory catalog with an optional JSON snapshot on disk.
///
/// Every mutation rewrites the snapshot, which is fine at personal
/// catalog sizes. Created without a path it is a plain memory store for
/// tests.
#[derive(Debug)]
pub struct JsonStore {
    inner: RwLock<Inner>,
    path: Option<PathBuf>,
}

impl JsonStore {
    pub fn in_memory() -> Self {
        Self {
            inner: RwLock::new(Inner {
                movies: BTreeMap::new(),
                next_id: 1,
            }),
            path: None,
        }
    }

    /// Open a catalog snapshot, creating an empty store if the file does
    /// not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut movies = BTreeMap::new();

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let records: Vec<MovieRecord> = serde_json::from_str(&contents)?;
            for record in records {
                movies.insert(record.id, record);
            }
            info!("Loaded {} records from {}", movies.len(), path.display());
        }

        let next_id = movies.keys().next_back().copied().unwrap_or(0) + 1;
        Ok(Self {
            inner: RwLock::new(Inner { movies, next_id }),
            path: Some(path),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, inner: &Inner) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let records: Vec<&MovieRecord> = inner.movies.values().collect();
        let contents = serde_json::to_string_pretty(&records)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[async_trait]
impl MovieStore for JsonStore {
    async fn get(&self, id: i64) -> Result<Option<MovieRecord>> {
        Ok(self.read().movies.get(&id).cloned())
    }

    async fn get_by_path(&self, path: &str) -> Result<Option<MovieRecord>> {
        Ok(self
            .read()
            .movies
            .values()
            .find(|m| m.file_path.as_deref() == Some(path))
            .cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<MovieRecord>> {
        let wanted = title.trim().to_lowercase();
        Ok(self
            .read()
            .movies
            .values()
            .find(|m| m.title.trim().to_lowercase() == wanted)
            .cloned())
    }

    async fn list(
        &self,
        filter: &MovieFilter,
        sort: MovieSort,
        page: Page,
    ) -> Result<Vec<MovieRecord>> {
        let inner = self.read();
        let mut matches: Vec<&MovieRecord> = inner
            .movies
            .values()
            .filter(|m| matches_filter(m, filter))
            .collect();

        sort_records(&mut matches, sort);

        if page.limit == 0 {
            return Ok(Vec::new());
        }

        // An out-of-range page clamps to the last page instead of
        // erroring, matching pagination expectations in the UI layer.
        let mut offset = page.offset as usize;
        if offset >= matches.len() && !matches.is_empty() {
            let last = (matches.len() - 1) / page.limit as usize;
            offset = last * page.limit as usize;
        }

        Ok(matches
            .into_iter()
            .skip(offset)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &MovieFilter) -> Result<usize> {
        Ok(self
            .read()
            .movies
            .values()
            .filter(|m| matches_filter(m, filter))
            .count())
    }

    async fn insert(&self, mut record: MovieRecord) -> Result<i64> {
        let mut inner = self.write();
        let id = inner.next_id;
        inner.next_id += 1;
        record.id = id;
        inner.movies.insert(id, record);
        self.persist(&inner)?;
        Ok(id)
    }

    async fn update(&self, record: &MovieRecord) -> Result<()> {
        let mut inner = self.write();
        inner.movies.insert(record.id, record.clone());
        self.persist(&inner)?;
        Ok(())
    }

    async fn update_fields(
        &self,
        id: i64,
        source: &MovieRecord,
        fields: &[MovieField],
    ) -> Result<()> {
        let mut inner = self.write();
        if let Some(stored) = inner.movies.get_mut(&id) {
            for field in fields {
                copy_field(stored, source, *field);
            }
        }
        self.persist(&inner)?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut inner = self.write();
        let removed = inner.movies.remove(&id).is_some();
        if removed {
            self.persist(&inner)?;
        }
        Ok(removed)
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .unwrap_or("")
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

fn matches_filter(movie: &MovieRecord, filter: &MovieFilter) -> bool {
    if let Some(needle) = &filter.title_contains
        && !movie.title.to_lowercase().contains(&needle.to_lowercase())
    {
        return false;
    }
    if let Some(needle) = &filter.director_contains
        && !contains_ci(movie.director.as_deref(), needle)
    {
        return false;
    }
    if let Some(needle) = &filter.genre_contains
        && !contains_ci(movie.genre.as_deref(), needle)
    {
        return false;
    }
    if let Some(needle) = &filter.path_contains
        && !contains_ci(movie.file_path.as_deref(), needle)
    {
        return false;
    }
    if let Some(needle) = &filter.codec_contains
        && !contains_ci(movie.codec.as_deref(), needle)
    {
        return false;
    }
    if let Some(ext) = &filter.extension
        && movie.extension.as_deref().map(str::to_lowercase) != Some(ext.to_lowercase())
    {
        return false;
    }
    if let Some(min) = filter.year_min
        && movie.year.is_none_or(|y| y < min)
    {
        return false;
    }
    if let Some(max) = filter.year_max
        && movie.year.is_none_or(|y| y > max)
    {
        return false;
    }
    if let Some(min) = filter.rating_min
        && movie.rating.is_none_or(|r| r < min)
    {
        return false;
    }
    if let Some(max) = filter.rating_max
        && movie.rating.is_none_or(|r| r > max)
    {
        return false;
    }
    if let Some(min) = filter.size_mb_min
        && movie.file_size_mb.is_none_or(|s| s < min)
    {
        return false;
    }
    if let Some(max) = filter.size_mb_max
        && movie.file_size_mb.is_none_or(|s| s > max)
    {
        return false;
    }
    if let Some(watched) = filter.watched
        && movie.watched != watched
    {
        return false;
    }
    if let Some(missing) = filter.missing_overview {
        let vacant = movie.overview.as_deref().is_none_or(|s| s.trim().is_empty());
        if vacant != missing {
            return false;
        }
    }
    if let Some(wanted) = filter.has_external_id {
        let present = movie
            .external_id
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if present != wanted {
            return false;
        }
    }
    if let Some(missing) = filter.missing_critic_rating
        && movie.critic_rating.is_some() == missing
    {
        return false;
    }
    true
}

fn sort_records(records: &mut [&MovieRecord], sort: MovieSort) {
    records.sort_by(|a, b| {
        let ordering = match sort.field {
            MovieSortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            MovieSortField::Year => a.year.cmp(&b.year),
            MovieSortField::Rating => a
                .rating
                .partial_cmp(&b.rating)
                .unwrap_or(std::cmp::Ordering::Equal),
            MovieSortField::Added => a.id.cmp(&b.id),
        };
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn copy_field(dst: &mut MovieRecord, src: &MovieRecord, field: MovieField) {
    match field {
        MovieField::PosterUrl => dst.poster_url = src.poster_url.clone(),
        MovieField::Overview => dst.overview = src.overview.clone(),
        MovieField::Year => dst.year = src.year,
        MovieField::Director => dst.director = src.director.clone(),
        MovieField::Genre => dst.genre = src.genre.clone(),
        MovieField::ExternalId => dst.external_id = src.external_id.clone(),
        MovieField::PublicRating => dst.public_rating = src.public_rating,
        MovieField::PublicVotes => dst.public_votes = src.public_votes,
        MovieField::CriticRating => dst.critic_rating = src.critic_rating,
        MovieField::CriticSource => dst.critic_source = src.critic_source.clone(),
        MovieField::CriticVotes => dst.critic_votes = src.critic_votes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(title: &str, year: Option<u16>) -> MovieRecord {
        MovieRecord {
            title: title.to_string(),
            year,
            ..MovieRecord::default()
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = JsonStore::in_memory();
        let a = store.insert(record("Alien", Some(1979))).await.unwrap();
        let b = store.insert(record("Brazil", Some(1985))).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(store.get(a).await.unwrap().unwrap().title, "Alien");
    }

    #[tokio::test]
    async fn get_by_path_matches_exactly() {
        let store = JsonStore::in_memory();
        let mut rec = record("Alien", Some(1979));
        rec.file_path = Some("/media/Alien.1979.mkv".to_string());
        store.insert(rec).await.unwrap();

        assert!(store
            .get_by_path("/media/Alien.1979.mkv")
            .await
            .unwrap()
            .is_some());
        assert!(store.get_by_path("/media/other.mkv").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_by_title_is_case_insensitive() {
        let store = JsonStore::in_memory();
        store.insert(record("The Matrix", Some(1999))).await.unwrap();

        assert!(store.find_by_title("the matrix").await.unwrap().is_some());
        assert!(store.find_by_title("The Matrix  ").await.unwrap().is_some());
        assert!(store.find_by_title("Matrix").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_and_sorts_by_title() {
        let store = JsonStore::in_memory();
        store.insert(record("brazil", Some(1985))).await.unwrap();
        store.insert(record("Alien", Some(1979))).await.unwrap();
        store.insert(record("Casablanca", Some(1942))).await.unwrap();

        let all = store
            .list(&MovieFilter::default(), MovieSort::default(), Page::default())
            .await
            .unwrap();
        let titles: Vec<&str> = all.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Alien", "brazil", "Casablanca"]);

        let filter = MovieFilter {
            year_min: Some(1970),
            year_max: Some(1990),
            ..MovieFilter::default()
        };
        let seventies = store
            .list(&filter, MovieSort::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(seventies.len(), 2);
    }

    #[tokio::test]
    async fn missing_overview_filter_selects_sweep_targets() {
        let store = JsonStore::in_memory();
        let mut described = record("Alien", Some(1979));
        described.overview = Some("In space no one can hear you scream.".to_string());
        store.insert(described).await.unwrap();
        let mut blank = record("Brazil", Some(1985));
        blank.overview = Some("   ".to_string());
        store.insert(blank).await.unwrap();
        store.insert(record("Casablanca", Some(1942))).await.unwrap();

        let filter = MovieFilter {
            missing_overview: Some(true),
            ..MovieFilter::default()
        };
        let targets = store
            .list(&filter, MovieSort::default(), Page::default())
            .await
            .unwrap();
        let titles: Vec<&str> = targets.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["Brazil", "Casablanca"]);
    }

    #[tokio::test]
    async fn path_and_codec_filters_match_substrings() {
        let store = JsonStore::in_memory();
        let mut on_disk = record("Alien", Some(1979));
        on_disk.file_path = Some("/media/Films/Alien.1979.mkv".to_string());
        on_disk.codec = Some("H.264".to_string());
        store.insert(on_disk).await.unwrap();
        store.insert(record("Brazil", Some(1985))).await.unwrap();

        let by_path = MovieFilter {
            path_contains: Some("films".to_string()),
            ..MovieFilter::default()
        };
        let hits = store
            .list(&by_path, MovieSort::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Alien");

        let by_codec = MovieFilter {
            codec_contains: Some("h.264".to_string()),
            ..MovieFilter::default()
        };
        assert_eq!(store.count(&by_codec).await.unwrap(), 1);

        // A record with no codec never matches a codec filter.
        let no_match = MovieFilter {
            codec_contains: Some("xvid".to_string()),
            ..MovieFilter::default()
        };
        assert_eq!(store.count(&no_match).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn extension_filter_is_exact_and_case_insensitive() {
        let store = JsonStore::in_memory();
        let mut mkv = record("Alien", None);
        mkv.extension = Some(".mkv".to_string());
        let mut mp4 = record("Brazil", None);
        mp4.extension = Some(".mp4".to_string());
        store.insert(mkv).await.unwrap();
        store.insert(mp4).await.unwrap();

        let filter = MovieFilter {
            extension: Some(".MKV".to_string()),
            ..MovieFilter::default()
        };
        let hits = store
            .list(&filter, MovieSort::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Alien");

        // ".mk" is not a prefix match.
        let partial = MovieFilter {
            extension: Some(".mk".to_string()),
            ..MovieFilter::default()
        };
        assert_eq!(store.count(&partial).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn rating_range_filter_excludes_unrated() {
        let store = JsonStore::in_memory();
        let mut good = record("Alien", None);
        good.rating = Some(9.0);
        let mut bad = record("Sequel", None);
        bad.rating = Some(3.5);
        store.insert(good).await.unwrap();
        store.insert(bad).await.unwrap();
        store.insert(record("Unrated", None)).await.unwrap();

        let filter = MovieFilter {
            rating_min: Some(5.0),
            ..MovieFilter::default()
        };
        let hits = store
            .list(&filter, MovieSort::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Alien");

        let band = MovieFilter {
            rating_min: Some(3.0),
            rating_max: Some(4.0),
            ..MovieFilter::default()
        };
        assert_eq!(store.count(&band).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn size_range_filter_brackets_file_sizes() {
        let store = JsonStore::in_memory();
        let mut small = record("Short", None);
        small.file_size_mb = Some(350.0);
        let mut large = record("Epic", None);
        large.file_size_mb = Some(4200.5);
        store.insert(small).await.unwrap();
        store.insert(large).await.unwrap();
        store.insert(record("No File", None)).await.unwrap();

        let filter = MovieFilter {
            size_mb_min: Some(1000.0),
            ..MovieFilter::default()
        };
        let hits = store
            .list(&filter, MovieSort::default(), Page::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Epic");

        let below = MovieFilter {
            size_mb_max: Some(1000.0),
            ..MovieFilter::default()
        };
        assert_eq!(store.count(&below).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn pagination_clamps_to_last_page() {
        let store = JsonStore::in_memory();
        for i in 0..5 {
            store.insert(record(&format!("Movie {i}"), None)).await.unwrap();
        }

        let page = store
            .list(
                &MovieFilter::default(),
                MovieSort::ascending(MovieSortField::Added),
                Page::new(2, 100),
            )
            .await
            .unwrap();
        // Last page holds the fifth record.
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Movie 4");
    }

    #[tokio::test]
    async fn update_fields_is_partial() {
        let store = JsonStore::in_memory();
        let id = store.insert(record("Cheri", None)).await.unwrap();

        // Concurrent edit the merge must not clobber.
        let mut stored = store.get(id).await.unwrap().unwrap();
        stored.rating = Some(8.0);
        store.update(&stored).await.unwrap();

        let mut merged = stored.clone();
        merged.year = Some(2009);
        merged.rating = Some(1.0); // outside the field list, must not land
        store
            .update_fields(id, &merged, &[MovieField::Year])
            .await
            .unwrap();

        let after = store.get(id).await.unwrap().unwrap();
        assert_eq!(after.year, Some(2009));
        assert_eq!(after.rating, Some(8.0));
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let store = JsonStore::in_memory();
        let id = store.insert(record("Alien", None)).await.unwrap();
        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn snapshot_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");

        {
            let store = JsonStore::open(&path).unwrap();
            let mut rec = record("Cheri", Some(2009));
            rec.external_id = Some("tt1179891".to_string());
            store.insert(rec).await.unwrap();
        }

        let reopened = JsonStore::open(&path).unwrap();
        let loaded = reopened.get(1).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Cheri");
        assert_eq!(loaded.external_id.as_deref(), Some("tt1179891"));

        // Ids keep counting past the loaded snapshot.
        let next = reopened.insert(record("Brazil", None)).await.unwrap();
        assert_eq!(next, 2);
    }
}
