use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use quotewall::app::App;
use quotewall::config::Config;
use quotewall::feed::{
    build_http_client, save_snapshot, FeedFetcher, FeedSource, SnapshotFallback,
};
use quotewall::refresh::{RefreshController, RefreshEvent, RefreshSettings, SyncStatus};
use quotewall::storage::{CacheStore, Store};

/// Get the config directory path (~/.config/quotewall/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("quotewall"))
}

#[derive(Parser, Debug)]
#[command(
    name = "quotewall",
    about = "Terminal quote wall fed by an RSS feed, with proxy fallback and offline cache"
)]
struct Args {
    /// Config file (default: ~/.config/quotewall/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the cache and theme preference (default: ~/.config/quotewall/)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Fetch (or load a fresh cache) once, print the posts and exit
    #[arg(long)]
    once: bool,

    /// Download the raw feed document to FILE and exit
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Delete the cached posts and exit
    #[arg(long)]
    clear_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent unless RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    let data_dir = args.data_dir.clone().unwrap_or(config_dir);
    let store = Store::open(&data_dir)
        .with_context(|| format!("Failed to open data directory '{}'", data_dir.display()))?;

    // Set directory permissions on Unix (user-only access)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(store.dir(), std::fs::Permissions::from_mode(0o700))
        {
            tracing::warn!(
                path = %store.dir().display(),
                error = %e,
                "Failed to set data directory permissions to 0700"
            );
        }
    }

    let cache = CacheStore::new(store.clone());

    if args.clear_cache {
        if cache.clear().context("Failed to clear cache")? {
            println!("Cache cleared.");
        } else {
            println!("No cache to clear.");
        }
        return Ok(());
    }

    let client = build_http_client(config.attempt_timeout())
        .context("Failed to build HTTP client")?;

    if let Some(path) = args.snapshot.as_deref() {
        return match save_snapshot(&client, &config.feed_url, path, config.attempt_timeout()).await
        {
            Ok(bytes) => {
                println!("Saved {} bytes to {}", bytes, path.display());
                Ok(())
            }
            Err((e, fallback)) => {
                let kept = match fallback {
                    SnapshotFallback::KeptPrevious => "previous snapshot kept",
                    SnapshotFallback::WroteEmpty => "empty placeholder written",
                };
                eprintln!("Error: snapshot failed: {} ({})", e, kept);
                std::process::exit(1);
            }
        };
    }

    let fetcher = FeedFetcher::new(
        client,
        config.feed_url.clone(),
        config.proxies.clone(),
        config.attempt_timeout(),
    );
    let source: Arc<dyn FeedSource> = Arc::new(fetcher);
    let (refresh_tx, refresh_rx) = mpsc::channel::<RefreshEvent>(32);

    if args.once {
        // No retries or timers: one attempt, then report
        let settings = RefreshSettings {
            max_retries: 0,
            auto_refresh_interval: None,
            ..config.refresh_settings()
        };
        return print_once(
            RefreshController::new(source, cache, settings, refresh_tx),
            refresh_rx,
            &config,
        )
        .await;
    }

    let controller = RefreshController::new(source, cache, config.refresh_settings(), refresh_tx);
    let mut app = App::new(
        controller,
        config.catalog(),
        store,
        config.theme_variant(),
        config.feed_url.clone(),
    );

    quotewall::ui::run(&mut app, refresh_rx).await?;
    Ok(())
}

/// Run a single refresh cycle and print the resulting posts.
async fn print_once(
    mut controller: RefreshController<dyn FeedSource>,
    mut refresh_rx: mpsc::Receiver<RefreshEvent>,
    config: &Config,
) -> Result<()> {
    controller.start(Utc::now());
    if !controller.controls_enabled() {
        let event = refresh_rx
            .recv()
            .await
            .context("Refresh task ended without a result")?;
        controller.handle_event(event, Utc::now());
    }

    match controller.status() {
        SyncStatus::FailedNoCache { error } => anyhow::bail!("No posts available: {}", error),
        SyncStatus::FailedWithCache { error } => {
            eprintln!("Warning: sync failed, showing cached data: {}", error);
        }
        _ => {}
    }

    let quotes = config.catalog().build(controller.posts(), Utc::now());
    for quote in &quotes {
        let view = &quote.view;
        println!("{}", view.body);
        for url in &view.images {
            println!("[image] {}", url);
        }
        let tags: Vec<String> = view.tags.iter().map(|t| format!("#{t}")).collect();
        println!(
            "-- {} {} {}",
            quotewall::catalog::category_label(&quote.category),
            view.time_label,
            tags.join(" ")
        );
        println!();
    }
    eprintln!("{} posts ({})", quotes.len(), controller.status().label());

    controller.shutdown();
    Ok(())
}
