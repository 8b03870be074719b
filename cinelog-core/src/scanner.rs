use crate::error::{CatalogError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Extensions treated as video files (lower-case, with dot).
pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mkv", ".avi", ".mov", ".wmv", ".mpg", ".mpeg"];

/// Walks a directory tree and collects the video files in it.
#[derive(Debug, Clone)]
pub struct MediaScanner {
    /// Allowed video file extensions (lower-case, with dot).
    pub video_extensions: Vec<String>,
    /// Maximum depth for directory traversal (None = unlimited).
    pub max_depth: Option<usize>,
    /// Whether to follow symbolic links.
    pub follow_links: bool,
}

impl Default for MediaScanner {
    fn default() -> Self {
        Self {
            video_extensions: VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            max_depth: None,
            follow_links: false,
        }
    }
}

/// A video file discovered by a scan.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size_bytes: u64,
    /// Lower-cased extension including the dot, e.g. ".mkv".
    pub extension: String,
}

impl ScannedFile {
    /// File size in megabytes, rounded to one decimal.
    pub fn size_mb(&self) -> f64 {
        let mb = self.size_bytes as f64 / (1024.0 * 1024.0);
        (mb * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ScanOutcome {
    pub total_files: usize,
    pub video_files: Vec<ScannedFile>,
    pub skipped_files: usize,
    pub errors: Vec<String>,
}

impl MediaScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum directory depth for scanning.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Enable following symbolic links.
    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Replace the extension allow-list.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.video_extensions = extensions;
        self
    }

    /// Check whether a path carries an allowed video extension.
    pub fn is_video_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .is_some_and(|ext| self.video_extensions.contains(&ext))
    }

    /// Scan a directory tree for video files.
    pub fn scan_directory<P: AsRef<Path>>(&self, root_path: P) -> Result<ScanOutcome> {
        let root_path = root_path.as_ref();

        info!("Scanning {} for video files", root_path.display());

        if !root_path.exists() {
            return Err(CatalogError::NotFound(format!(
                "Directory does not exist: {}",
                root_path.display()
            )));
        }

        if !root_path.is_dir() {
            return Err(CatalogError::InvalidPath(format!(
                "Path is not a directory: {}",
                root_path.display()
            )));
        }

        let mut walker = WalkDir::new(root_path).follow_links(self.follow_links);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut outcome = ScanOutcome::default();

        for entry in walker {
            match entry {
                Ok(entry) => self.process_entry(&entry, &mut outcome),
                Err(e) => {
                    warn!("Error walking directory: {}", e);
                    outcome.errors.push(format!("Directory walk error: {e}"));
                }
            }
        }

        info!(
            "Scan complete: {} total files, {} video files, {} skipped, {} errors",
            outcome.total_files,
            outcome.video_files.len(),
            outcome.skipped_files,
            outcome.errors.len()
        );

        Ok(outcome)
    }

    fn process_entry(&self, entry: &DirEntry, outcome: &mut ScanOutcome) {
        if entry.file_type().is_dir() {
            return;
        }

        outcome.total_files += 1;
        let path = entry.path();

        if !self.is_video_file(path) {
            outcome.skipped_files += 1;
            return;
        }

        let size_bytes = match entry.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                warn!("Failed to stat {}: {}", path.display(), e);
                outcome.errors.push(format!("{}: {e}", path.display()));
                return;
            }
        };

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();

        debug!("Found video file: {} ({} bytes)", file_name, size_bytes);

        outcome.video_files.push(ScannedFile {
            path: path.to_path_buf(),
            file_name,
            size_bytes,
            extension,
        });
    }
}
