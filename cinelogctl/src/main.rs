mod cli;

use anyhow::{Context, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinelog_config::{Config, ConfigSource};
use cinelog_core::{
    CatalogService, CsvImportOptions, JsonStore, OmdbProvider, TmdbProvider,
};
use cinelog_model::{MovieFilter, MovieRecord, Page};

use cli::{Cli, Command, ListArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,cinelog_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let args = Cli::parse();

    let (config, source) = Config::load_from_env().context("failed to load configuration")?;
    match &source {
        ConfigSource::EnvPath(path) | ConfigSource::File(path) => {
            debug!(path = %path.display(), "configuration loaded from file");
        }
        ConfigSource::Default => debug!("using default configuration"),
    }

    let store = Arc::new(
        JsonStore::open(&config.catalog_path).with_context(|| {
            format!("failed to open catalog {}", config.catalog_path.display())
        })?,
    );

    let mut service = CatalogService::new(store);
    // TMDB is the primary metadata database; OMDb steps in for metadata
    // when it is the only key configured, and always serves critic
    // ratings.
    match (&config.tmdb_api_key, &config.omdb_api_key) {
        (Some(key), _) => {
            service = service.with_metadata_source(Arc::new(TmdbProvider::new(key)));
        }
        (None, Some(key)) => {
            service = service.with_metadata_source(Arc::new(OmdbProvider::new(key)));
        }
        (None, None) => {}
    }
    if let Some(key) = &config.omdb_api_key {
        service = service.with_ratings_source(Arc::new(OmdbProvider::new(key)));
    }

    run(args, &config, &service).await
}

async fn run(args: Cli, config: &Config, service: &CatalogService) -> anyhow::Result<()> {
    match args.command {
        Command::Scan { path } => {
            let root = match path.or_else(|| config.library_root.clone()) {
                Some(root) => root,
                None => bail!("no folder given and no library_root configured"),
            };
            scan(service, root).await
        }
        Command::Import {
            file,
            watched,
            titles_only,
        } => import(service, file, watched, titles_only).await,
        Command::Enrich => {
            let report = service.fill_missing_metadata().await?;
            println!(
                "Checked {} movies, updated {}",
                report.checked, report.updated
            );
            Ok(())
        }
        Command::Refresh { id } => {
            match service.refresh_movie(id).await? {
                Some(changed) if changed.is_empty() => {
                    println!("Already up to date");
                }
                Some(changed) => {
                    let names: Vec<&str> = changed.iter().map(|f| f.as_str()).collect();
                    println!("Updated: {}", names.join(", "));
                }
                None => warn!("provider returned no match"),
            }
            Ok(())
        }
        Command::Ratings => {
            let report = service.fetch_critic_ratings().await?;
            println!(
                "Checked {} movies, updated {}",
                report.checked, report.updated
            );
            Ok(())
        }
        Command::List(list_args) => list(service, config, list_args).await,
        Command::Show { id } => {
            let movie = service.get_movie(id).await?;
            show(&movie);
            Ok(())
        }
        Command::Edit(edit_args) => {
            let edit = edit_args.edit();
            if edit.is_empty() {
                bail!("nothing to change; pass at least one of --title, --year, --genre, --director, --codec");
            }
            let movie = service.edit_movie(edit_args.id, edit).await?;
            show(&movie);
            Ok(())
        }
        Command::Random { genre, unwatched } => {
            let filter = MovieFilter {
                genre_contains: genre,
                watched: unwatched.then_some(false),
                ..MovieFilter::default()
            };
            match service.random_movie(&filter).await? {
                Some(movie) => show(&movie),
                None => println!("No movies match"),
            }
            Ok(())
        }
        Command::Watch { id, undo } => {
            service.set_watched(id, !undo).await?;
            println!(
                "Marked {} as {}",
                id,
                if undo { "unwatched" } else { "watched" }
            );
            Ok(())
        }
        Command::Rate { id, rating } => {
            if let Some(rating) = rating
                && !(0.0..=10.0).contains(&rating)
            {
                bail!("rating must be between 0 and 10");
            }
            service.set_rating(id, rating).await?;
            Ok(())
        }
        Command::Delete { id } => {
            service.delete_movie(id).await?;
            println!("Deleted movie {id}");
            Ok(())
        }
    }
}

async fn scan(service: &CatalogService, root: PathBuf) -> anyhow::Result<()> {
    info!("Scanning {}", root.display());
    let report = service.scan_folder(&root).await?;
    println!(
        "Found {} video files, added {} new records",
        report.files_found, report.records_added
    );
    for error in &report.errors {
        warn!("{}", error);
    }
    Ok(())
}

async fn import(
    service: &CatalogService,
    file: PathBuf,
    watched: bool,
    titles_only: bool,
) -> anyhow::Result<()> {
    let report = service
        .import_csv(
            &file,
            CsvImportOptions {
                watched,
                titles_only,
            },
        )
        .await?;
    println!("Imported {} movies", report.imported);
    for (row, reason) in &report.skipped {
        println!("  row {row}: skipped ({reason})");
    }
    Ok(())
}

async fn list(
    service: &CatalogService,
    config: &Config,
    args: ListArgs,
) -> anyhow::Result<()> {
    let filter = args.filter();
    let total = service.count_movies(&filter).await?;
    let movies = service
        .list_movies(&filter, args.sort(), Page::number(args.page, config.page_size))
        .await?;

    for movie in &movies {
        let mark = if movie.watched { "x" } else { " " };
        let rating = movie
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{:>4} [{}] {:<50} {}", movie.id, mark, movie.display_title(), rating);
    }

    let pages = total.div_ceil(config.page_size.max(1) as usize).max(1);
    println!("{} movies, page {} of {}", total, args.page.min(pages as u32), pages);
    Ok(())
}

fn show(movie: &MovieRecord) {
    println!("{}", movie.display_title());
    let fields: [(&str, Option<String>); 12] = [
        ("Director", movie.director.clone()),
        ("Genre", movie.genre.clone()),
        ("Watched", Some(if movie.watched { "yes" } else { "no" }.to_string())),
        ("My rating", movie.rating.map(|r| format!("{r:.1}"))),
        (
            "Public rating",
            movie.public_rating.map(|r| match movie.public_votes {
                Some(votes) => format!("{r:.1} ({votes} votes)"),
                None => format!("{r:.1}"),
            }),
        ),
        (
            "Critic rating",
            movie.critic_rating.map(|r| match &movie.critic_source {
                Some(source) => format!("{r:.1} ({source})"),
                None => format!("{r:.1}"),
            }),
        ),
        ("External id", movie.external_id.clone()),
        ("Poster", movie.poster_url.clone()),
        ("File", movie.file_path.clone()),
        ("Size (MB)", movie.file_size_mb.map(|s| format!("{s:.1}"))),
        ("Codec", movie.codec.clone()),
        ("Overview", movie.overview.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("  {label:<14} {value}");
        }
    }
}
