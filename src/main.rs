mod activity;
mod chart_sync;
mod colors;
mod cursor;
mod error;
mod feed;
mod geo;
mod headless;
mod help;
mod ingest;
mod markers;
mod pipeline;
mod render_sync;
mod settings;
mod terminal;
mod view;

use clap::{Args, Parser, Subcommand};
use feed::demo::DemoFeed;
use feed::http::HttpFeed;
use feed::FeedSource;
use settings::Settings;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "trafficglobe")]
#[command(author = "Terminal Art Generator")]
#[command(version)]
#[command(about = "trafficglobe: live geolocated network traffic on a terminal globe", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/trafficglobe/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file (globe default: ~/.cache/trafficglobe/trafficglobe.log; tail logs to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive rotating globe with activity chart and stats
    Globe {
        #[command(flatten)]
        feed: FeedArgs,

        /// Initial tilt in degrees
        #[arg(long)]
        tilt: Option<f32>,
    },

    /// Run the pipeline without a display, logging one line per cycle
    Tail {
        #[command(flatten)]
        feed: FeedArgs,

        /// Stop after this many poll cycles
        #[arg(long)]
        cycles: Option<u64>,
    },

    /// Fetch once, report what the feed returned, exit non-zero on failure
    Check {
        #[command(flatten)]
        feed: FeedArgs,
    },
}

#[derive(Args)]
struct FeedArgs {
    /// Traffic server root (or full /get_traffic URL)
    #[arg(short, long)]
    url: Option<String>,

    /// Use the built-in synthetic feed instead of a server
    #[arg(short, long)]
    demo: bool,

    /// Poll interval in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Marker lifetime in milliseconds
    #[arg(long)]
    ttl_ms: Option<u64>,

    /// Random seed for the demo feed
    #[arg(short, long)]
    seed: Option<u64>,
}

impl FeedArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(url) = &self.url {
            settings.feed.url = url.clone();
        }
        if let Some(ms) = self.poll_ms {
            settings.feed.poll_interval_ms = ms;
        }
        if let Some(ms) = self.ttl_ms {
            settings.feed.marker_ttl_ms = ms;
        }
    }

    fn source(&self, settings: &Settings) -> Arc<dyn FeedSource> {
        if self.demo {
            Arc::new(DemoFeed::new(self.seed))
        } else {
            Arc::new(HttpFeed::new(&settings.feed.url, settings.feed.request_timeout()))
        }
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("trafficglobe")
        .join("trafficglobe.log")
}

/// The globe owns the screen, so its logs go to a file (or nowhere)
fn init_file_logging(path: &Path, verbose: bool) {
    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| File::options().create(true).append(true).open(path));

    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(env_filter(verbose))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(true)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(env_filter(verbose))
            .with_writer(io::sink)
            .init(),
    }
}

fn init_stderr_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Globe { feed, tilt } => {
            let log_path = cli.log_file.unwrap_or_else(default_log_path);
            init_file_logging(&log_path, cli.verbose);

            let mut settings = Settings::load(cli.config.as_deref());
            feed.apply(&mut settings);
            if let Some(tilt) = tilt {
                settings.globe.tilt_deg = tilt;
            }
            let source = feed.source(&settings);
            view::run(&settings, source)?;
        }
        Commands::Tail { feed, cycles } => {
            match &cli.log_file {
                Some(path) => init_file_logging(path, cli.verbose),
                None => init_stderr_logging(cli.verbose),
            }

            let mut settings = Settings::load(cli.config.as_deref());
            feed.apply(&mut settings);
            let source = feed.source(&settings);
            headless::run(&settings, source, cycles);
        }
        Commands::Check { feed } => {
            match &cli.log_file {
                Some(path) => init_file_logging(path, cli.verbose),
                None => init_stderr_logging(cli.verbose),
            }

            let mut settings = Settings::load(cli.config.as_deref());
            feed.apply(&mut settings);
            let source = feed.source(&settings);
            match headless::check(&settings, source.as_ref()) {
                Ok(report) => println!(
                    "ok: {} events ({} suspicious), cursor {}",
                    report.new_markers,
                    report.stats.suspicious_markers,
                    report.cursor.map_or_else(|| "-".to_string(), |c| c.to_string()),
                ),
                Err(e) => {
                    eprintln!("{}: {e}", source.describe());
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
