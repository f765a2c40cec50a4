//! Command-line client: upload a video and wait for the transcoded outputs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tcoder_client::{TcoderClient, TcoderConfig};
use tcoder_models::{Job, JobStatus, Preset};
use tcoder_session::{SelectedFile, SessionState, TranscodeSession};

#[derive(Debug, Parser)]
#[command(
    name = "tcoder",
    about = "Upload a video to the tcoder transcoding service and wait for the outputs"
)]
struct Args {
    /// Video file to upload
    file: PathBuf,

    /// Transcoding preset
    #[arg(long, default_value = "default")]
    preset: Preset,

    /// Base URL of the transcoding service (overrides TCODER_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Delay between status queries, in milliseconds
    #[arg(long, default_value_t = 3000)]
    poll_interval_ms: u64,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Args::parse();

    let mut config = TcoderConfig::from_env();
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url);
    }
    info!(base_url = %config.base_url, preset = %args.preset, "Starting tcoder upload");

    let client = match TcoderClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create client: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = TranscodeSession::with_poll_interval(
        Arc::new(client),
        args.preset,
        Duration::from_millis(args.poll_interval_ms),
    );

    let file = match SelectedFile::from_path(&args.file) {
        Ok(file) => file,
        Err(e) => {
            error!(path = %args.file.display(), "{}", e);
            std::process::exit(1);
        }
    };
    info!(
        file = %file.name,
        content_type = %file.content_type,
        size = file.bytes.len(),
        "Selected file"
    );

    if let Err(e) = session.select_file(file) {
        error!("{}", e);
        std::process::exit(1);
    }

    let job_id = match session.confirm_upload().await {
        Ok(job_id) => job_id,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    println!("job {}", job_id);

    let mut last_status: Option<JobStatus> = None;
    while let Some(state) = session.next_update().await {
        if let Some(job) = session.job() {
            if last_status != Some(job.status) {
                last_status = Some(job.status);
                print_status(job);
            }
        }
        if state != SessionState::Polling {
            break;
        }
    }

    match session.state() {
        SessionState::Completed => {
            if let Some(job) = session.job() {
                print_outputs(job);
            }
        }
        SessionState::Failed => {
            error!("{}", session.error().unwrap_or("Transcoding failed"));
            std::process::exit(1);
        }
        state => {
            error!(?state, "Polling ended unexpectedly");
            std::process::exit(1);
        }
    }
}

fn print_status(job: &Job) {
    match job.machine_id.as_deref() {
        Some(machine) => println!(
            "[{}] {} (worker {})",
            job.status.label(),
            job.status.description(),
            machine
        ),
        None => println!("[{}] {}", job.status.label(), job.status.description()),
    }
}

fn print_outputs(job: &Job) {
    println!("transcoded outputs:");
    for output in &job.outputs {
        println!("  [{}] {}", output.quality, output.playback_url());
    }

    let cdn_urls: Vec<_> = job
        .outputs
        .iter()
        .filter_map(|o| o.cdn_url.as_deref().map(|url| (o.quality, url)))
        .collect();
    if !cdn_urls.is_empty() {
        println!("cdn urls:");
        for (quality, url) in cdn_urls {
            println!("  [{}] {}", quality, url);
        }
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("tcoder=info".parse().expect("static directive parses"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}
