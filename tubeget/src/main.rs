mod progress_bar;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser};
use colored::Colorize;
use download_client::health::check_health;
use download_client::utils::format_bytes;
use download_client::{
    ClientConfig, Download, JobRequest, JobType, ProgressStream, ProgressUpdate, StreamState,
};
use tracing::{Level, debug};
use utils::logging::{self, LogConfig};
use uuid::Uuid;

use progress_bar::ProgressBar;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Video URL to download
    url: Option<String>,

    /// Job type
    #[arg(short = 't', long = "type", value_name = "TYPE",
          value_parser = ["both", "videoonly", "audioonly"],
          default_value = "both")]
    job_type: String,

    /// Output extension (defaults to the first one allowed for the type)
    #[arg(short = 'f', long = "format", value_name = "EXT")]
    format: Option<String>,

    /// Directory the file is saved into
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    dir: PathBuf,

    /// Backend origin (overrides TUBEGET_BACKEND_ENDPOINT)
    #[arg(long = "backend", value_name = "ORIGIN")]
    backend: Option<String>,

    /// Submission endpoint path (overrides TUBEGET_API_ENDPOINT)
    #[arg(long = "api-path", value_name = "PATH")]
    api_path: Option<String>,

    /// Progress endpoint path (overrides TUBEGET_SSE_ENDPOINT)
    #[arg(long = "sse-path", value_name = "PATH")]
    sse_path: Option<String>,

    /// Log directory
    #[arg(short = 'l', long = "log", value_name = "DIR", default_value = ".dev/logs")]
    log: String,

    /// Set console log level
    #[arg(long = "console-log-level", value_name = "LEVEL",
          value_parser = ["trace", "debug", "info", "warn", "error"],
          default_value = "warn")]
    log_level: String,

    /// Check that the backend is reachable and exit
    #[arg(long = "health", action = ArgAction::SetTrue)]
    health: bool,

    /// Open a test progress stream, print the received pings, and exit
    #[arg(long = "probe-stream", action = ArgAction::SetTrue)]
    probe_stream: bool,

    /// Path of the test stream used by --probe-stream
    #[arg(long = "probe-path", value_name = "PATH", default_value = "api/test-stream")]
    probe_path: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match logging::init_logging(LogConfig {
        app_name: "tubeget".into(),
        log_dir: cli.log.clone().into(),
        silent_deps: vec!["hyper_util".into(), "reqwest".into(), "mio".into()],
        max_level: match cli.log_level.as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => {
                eprintln!(
                    "invalid log level in arguments, use one of [\"trace\", \"debug\", \"info\", \"warn\", \"error\"]"
                );
                Level::WARN
            }
        },
        ..Default::default()
    }) {
        Ok(_) => {
            debug!("Logger initialized");
        }
        Err(e) => {
            eprintln!("Failed to initialize logger: {}", e);
        }
    }

    let mut config = ClientConfig::from_env();
    if let Some(backend) = &cli.backend {
        config.backend_origin = backend.clone();
    }
    if let Some(api_path) = &cli.api_path {
        config.api_path = api_path.clone();
    }
    if let Some(sse_path) = &cli.sse_path {
        config.sse_path = sse_path.clone();
    }

    let result = if cli.health {
        run_health(&config).await
    } else if cli.probe_stream {
        run_probe(&config, &cli.probe_path).await
    } else {
        run_download(&cli, config).await
    };

    if let Err(err) = result {
        eprintln!("{} {}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}

async fn run_download(cli: &Cli, config: ClientConfig) -> anyhow::Result<()> {
    let url = cli
        .url
        .clone()
        .context("missing video URL, pass one as the first argument")?;
    let job_type = JobType::from_key(&cli.job_type).context("unknown job type")?;

    // Validation happens here; an invalid request is never submitted.
    let request = JobRequest::new(url, job_type, cli.format.as_deref())?;
    debug!(job_id = %request.id, "request validated");

    let bar = Arc::new(ProgressBar::new());
    let download = Download::new(request, config, cli.dir.clone());
    let result = download.run(bar.clone()).await;
    bar.finish();

    let saved = result?;
    println!(
        "{} {} ({})",
        "Downloaded:".green().bold(),
        saved.file_name,
        format_bytes(saved.bytes)
    );
    Ok(())
}

async fn run_health(config: &ClientConfig) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    check_health(&client, config)
        .await
        .context("backend is unreachable")?;
    println!("{}", "Backend is alive".green());
    Ok(())
}

/// Subscribe to the backend's test stream with a fresh id and print every
/// ping as it arrives.
async fn run_probe(config: &ClientConfig, probe_path: &str) -> anyhow::Result<()> {
    let config = ClientConfig {
        sse_path: probe_path.to_string(),
        ..config.clone()
    };
    let job_id = Uuid::new_v4();
    println!("Connecting...");

    let client = reqwest::Client::new();
    let mut stream = ProgressStream::open(&client, &config, job_id).await?;

    let mut pings = 0usize;
    loop {
        match stream.next_update().await {
            Ok(Some(ProgressUpdate::Percent(percent))) => {
                pings += 1;
                println!("Ping {pings}: {percent}%");
            }
            Ok(Some(ProgressUpdate::Phase(message))) => println!("{message}"),
            Ok(None) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if stream.state() == StreamState::Done {
        println!("{}", "Test completed!".green());
    } else {
        println!("Stream closed by the server.");
    }
    Ok(())
}
