use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use hubfetch::filter::parse_pattern_list;
use hubfetch::{
    CancelHandle, HttpClientConfig, HubClient, RepoDownloaderBuilder, RepoRef, RunOutcome,
    Settings, SettingsStore, StyleOptions,
};
use indicatif::{HumanBytes, HumanDuration};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Download a whole Hugging Face repository, resuming where the last run stopped.
///
/// Values left out fall back to the ones used last time.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Repository URL (`https://huggingface.co/org/model`, a mirror URL, or `org/model`).
    url: Option<String>,

    /// Directory that receives a `<org>_<name>` folder per repository.
    output_dir: Option<PathBuf>,

    /// Access token for private or gated repositories.
    #[arg(long)]
    token: Option<String>,

    /// Comma-separated globs of files to download, e.g. "*.json,*.safetensors".
    #[arg(long)]
    include: Option<String>,

    /// Comma-separated globs of files to skip.
    #[arg(long)]
    exclude: Option<String>,

    /// Files downloaded at the same time.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    max_workers: Option<u16>,

    /// Attempts per file before it is recorded as failed.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    retries: u32,

    /// Progress ledger used to resume.
    #[arg(long)]
    progress_file: Option<PathBuf>,

    /// Where the last-used settings are kept.
    #[arg(long, default_value = SettingsStore::DEFAULT_FILE)]
    settings_file: PathBuf,

    /// Do not remember the settings of this run.
    #[arg(long)]
    no_save: bool,

    /// Hide the progress bars and log progress instead.
    #[arg(short, long)]
    quiet: bool,

    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

const EXIT_PARTIAL: u8 = 2;
const EXIT_CANCELLED: u8 = 130;

fn init_tracing(args: &Args) -> Result<()> {
    // Bars and log lines share the terminal, so stay quieter while bars are drawn.
    let console_default = if args.quiet { "hubfetch=info" } else { "hubfetch=warn" };
    let filter = |default: &str| {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    let file_layer = match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter("hubfetch=info")),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter(console_default)),
        )
        .with(file_layer)
        .init();
    Ok(())
}

fn non_empty(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Command line values over the last-used ones.
fn merge(args: &Args, last: &Settings) -> Settings {
    Settings {
        url: non_empty(args.url.clone(), &last.url),
        output_dir: args
            .output_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| last.output_dir.clone()),
        token: non_empty(args.token.clone(), &last.token),
        include_patterns: args
            .include
            .clone()
            .unwrap_or_else(|| last.include_patterns.clone()),
        exclude_patterns: args
            .exclude
            .clone()
            .unwrap_or_else(|| last.exclude_patterns.clone()),
        max_workers: args
            .max_workers
            .map(usize::from)
            .unwrap_or(last.max_workers)
            .max(1),
        progress_file: args
            .progress_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| last.progress_file.clone()),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(&args)?;

    let store = SettingsStore::new(&args.settings_file);
    let last = store.load();
    let lines = last.display_lines();
    if lines.is_empty() {
        println!("First run, using default settings");
    } else {
        for line in lines {
            println!("{}", line);
        }
    }

    let settings = merge(&args, &last);
    if settings.url.is_empty() {
        return Err(eyre!("no repository URL given and none remembered"));
    }
    if !args.no_save {
        if let Err(e) = store.save(&settings) {
            warn!("Could not save settings to {:?}: {}", store.path(), e);
        }
    }

    let repo = RepoRef::parse(&settings.url)?;
    if repo.is_mirror() {
        info!("Using mirror endpoint {}", repo.endpoint_str());
        let probe = HubClient::new(repo.clone(), HttpClientConfig::default())?;
        match probe.check_endpoint().await {
            Ok(status) if status.is_server_error() => {
                warn!("Mirror {} answered {}", repo.endpoint_str(), status)
            }
            Ok(_) => {}
            Err(e) => warn!("Mirror {} looks unreachable: {}", repo.endpoint_str(), e),
        }
    } else {
        info!("Using official endpoint {}", repo.endpoint_str());
    }

    let destination = PathBuf::from(&settings.output_dir).join(repo.local_dir_name());
    println!("Downloading {} into {}", repo, destination.display());

    let cancel = CancelHandle::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Stopping after the transfers in flight...");
            on_ctrl_c.cancel();
        }
    });

    let mut builder = RepoDownloaderBuilder::new(repo)
        .directory(destination)
        .include(parse_pattern_list(&settings.include_patterns))
        .exclude(parse_pattern_list(&settings.exclude_patterns))
        .concurrent_downloads(settings.max_workers)
        .max_attempts(args.retries)
        .progress_file(PathBuf::from(&settings.progress_file))
        .cancel_handle(cancel);
    if !settings.token.is_empty() {
        builder = builder.token(settings.token.clone());
    }
    if args.quiet {
        builder = builder.style_options(StyleOptions::hidden());
    }
    let downloader = builder.build()?;

    let report = downloader.run().await?;
    let snapshot = &report.snapshot;
    println!();
    println!(
        "Succeeded: {}  Failed: {}  Total: {}",
        snapshot.completed, snapshot.failed, snapshot.total
    );
    println!(
        "Elapsed: {}  Downloaded: {}",
        HumanDuration(report.duration),
        HumanBytes(snapshot.downloaded_size)
    );
    println!("Saved to: {}", report.directory.display());

    Ok(match report.outcome {
        RunOutcome::Success => ExitCode::SUCCESS,
        RunOutcome::PartialFailure => {
            println!("Some files failed; run again to retry them.");
            ExitCode::from(EXIT_PARTIAL)
        }
        RunOutcome::Cancelled => {
            println!("Cancelled; run again to resume.");
            ExitCode::from(EXIT_CANCELLED)
        }
    })
}
