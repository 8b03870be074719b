use cinelog_core::MovieEdit;
use cinelog_model::{MovieFilter, MovieSort, MovieSortField, SortDirection};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "cinelogctl",
    version,
    about = "Manage a personal movie catalog"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a folder for video files and add new ones to the catalog
    Scan {
        /// Folder to scan; defaults to the configured library root
        path: Option<PathBuf>,
    },
    /// Bulk-import titles from a CSV file
    Import {
        file: PathBuf,
        /// Mark every imported movie as watched
        #[arg(long)]
        watched: bool,
        /// Skip the metadata lookup and create bare title records
        #[arg(long)]
        titles_only: bool,
    },
    /// Fetch metadata for records that have none yet
    Enrich,
    /// Re-fetch metadata for one movie, overwriting current values
    Refresh { id: i64 },
    /// Fetch critic ratings for records carrying an external id
    Ratings,
    /// List movies
    List(ListArgs),
    /// Show one movie in full
    Show { id: i64 },
    /// Correct a movie's details by hand
    Edit(EditArgs),
    /// Pick a random movie, optionally among a filtered subset
    Random {
        /// Genre substring match
        #[arg(long)]
        genre: Option<String>,
        /// Only unwatched movies
        #[arg(long)]
        unwatched: bool,
    },
    /// Mark a movie as watched
    Watch {
        id: i64,
        /// Mark as unwatched instead
        #[arg(long)]
        undo: bool,
    },
    /// Set a personal rating; omit the value to clear it
    Rate { id: i64, rating: Option<f32> },
    /// Remove a movie from the catalog
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: i64,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub year: Option<u16>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub director: Option<String>,
    #[arg(long)]
    pub codec: Option<String>,
}

impl EditArgs {
    pub fn edit(&self) -> MovieEdit {
        MovieEdit {
            title: self.title.clone(),
            year: self.year,
            genre: self.genre.clone(),
            director: self.director.clone(),
            codec: self.codec.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Title substring match
    #[arg(long)]
    pub title: Option<String>,
    /// Director substring match
    #[arg(long)]
    pub director: Option<String>,
    /// Genre substring match
    #[arg(long)]
    pub genre: Option<String>,
    /// File path substring match
    #[arg(long)]
    pub path: Option<String>,
    /// Codec substring match
    #[arg(long)]
    pub codec: Option<String>,
    /// Exact file extension, e.g. ".mkv"
    #[arg(long)]
    pub extension: Option<String>,
    /// Exact release year
    #[arg(long, conflicts_with_all = ["year_min", "year_max"])]
    pub year: Option<u16>,
    #[arg(long)]
    pub year_min: Option<u16>,
    #[arg(long)]
    pub year_max: Option<u16>,
    /// Minimum personal rating
    #[arg(long)]
    pub rating_min: Option<f32>,
    /// Maximum personal rating
    #[arg(long)]
    pub rating_max: Option<f32>,
    /// Minimum file size in MB
    #[arg(long)]
    pub size_min: Option<f64>,
    /// Maximum file size in MB
    #[arg(long)]
    pub size_max: Option<f64>,
    /// Only watched movies
    #[arg(long, conflicts_with = "unwatched")]
    pub watched: bool,
    /// Only unwatched movies
    #[arg(long)]
    pub unwatched: bool,
    /// Only records still missing an overview
    #[arg(long)]
    pub missing_metadata: bool,
    #[arg(long, value_enum, default_value_t)]
    pub sort: SortArg,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SortArg {
    #[default]
    Title,
    Year,
    Rating,
    Added,
}

impl ListArgs {
    pub fn filter(&self) -> MovieFilter {
        MovieFilter {
            title_contains: self.title.clone(),
            director_contains: self.director.clone(),
            genre_contains: self.genre.clone(),
            path_contains: self.path.clone(),
            codec_contains: self.codec.clone(),
            extension: self.extension.clone(),
            year_min: self.year.or(self.year_min),
            year_max: self.year.or(self.year_max),
            rating_min: self.rating_min,
            rating_max: self.rating_max,
            size_mb_min: self.size_min,
            size_mb_max: self.size_max,
            watched: match (self.watched, self.unwatched) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            },
            missing_overview: self.missing_metadata.then_some(true),
            ..MovieFilter::default()
        }
    }

    pub fn sort(&self) -> MovieSort {
        let field = match self.sort {
            SortArg::Title => MovieSortField::Title,
            SortArg::Year => MovieSortField::Year,
            SortArg::Rating => MovieSortField::Rating,
            SortArg::Added => MovieSortField::Added,
        };
        MovieSort {
            field,
            direction: if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn exact_year_sets_both_bounds() {
        let cli = Cli::parse_from(["cinelogctl", "list", "--year", "2009"]);
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        let filter = args.filter();
        assert_eq!(filter.year_min, Some(2009));
        assert_eq!(filter.year_max, Some(2009));
    }

    #[test]
    fn file_oriented_flags_map_to_filter() {
        let cli = Cli::parse_from([
            "cinelogctl",
            "list",
            "--path",
            "/media/films",
            "--codec",
            "xvid",
            "--extension",
            ".mkv",
            "--rating-min",
            "6",
            "--size-max",
            "2000",
        ]);
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        let filter = args.filter();
        assert_eq!(filter.path_contains.as_deref(), Some("/media/films"));
        assert_eq!(filter.codec_contains.as_deref(), Some("xvid"));
        assert_eq!(filter.extension.as_deref(), Some(".mkv"));
        assert_eq!(filter.rating_min, Some(6.0));
        assert_eq!(filter.size_mb_max, Some(2000.0));
    }

    #[test]
    fn edit_collects_only_given_fields() {
        let cli = Cli::parse_from([
            "cinelogctl",
            "edit",
            "7",
            "--codec",
            "H.264",
            "--year",
            "2009",
        ]);
        let Command::Edit(args) = cli.command else {
            panic!("expected edit command");
        };
        assert_eq!(args.id, 7);
        let edit = args.edit();
        assert_eq!(edit.codec.as_deref(), Some("H.264"));
        assert_eq!(edit.year, Some(2009));
        assert!(edit.title.is_none());
        assert!(!edit.is_empty());
    }

    #[test]
    fn watched_flags_map_to_filter() {
        let cli = Cli::parse_from(["cinelogctl", "list", "--unwatched", "--desc"]);
        let Command::List(args) = cli.command else {
            panic!("expected list command");
        };
        assert_eq!(args.filter().watched, Some(false));
        assert_eq!(args.sort().direction, SortDirection::Descending);
    }
}
