use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use album_gateway::client::{BackendClient, ClientConfig};
use album_gateway::config::ObservabilityConfig;
use album_gateway::jobs::{ImageUpload, JobId, JobPoller, PollPolicy, UploadProgress, Uploader};
use album_gateway::observability::logging::init_logging;
use album_gateway::resilience::backoff::Backoff;

#[derive(Parser)]
#[command(name = "album-cli")]
#[command(about = "Command-line client for the album API", long_about = None)]
struct Cli {
    /// Gateway or backend base URL.
    #[arg(short, long, env = "ALBUM_API_URL", default_value = "http://localhost:3000")]
    url: String,

    /// Path prefix the API is mounted under.
    #[arg(long, default_value = "/api")]
    prefix: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Log level for diagnostics on stderr.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Album operations
    #[command(subcommand)]
    Albums(AlbumCommands),
    /// Image operations
    #[command(subcommand)]
    Image(ImageCommands),
    /// Upload an image and wait for processing to finish
    Upload {
        #[arg(long)]
        album: String,
        #[arg(long)]
        file: PathBuf,
        #[command(flatten)]
        polling: PollArgs,
    },
    /// Job inspection
    #[command(subcommand)]
    Job(JobCommands),
}

#[derive(Subcommand)]
enum AlbumCommands {
    /// List all albums
    List,
    /// Show one album
    Get { id: String },
    /// Create an album
    Create { name: String },
    /// Delete an album
    Delete { id: String },
}

#[derive(Subcommand)]
enum ImageCommands {
    /// Download a full-size image
    Get {
        #[arg(long)]
        album: String,
        #[arg(long)]
        image: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Download a thumbnail
    Thumbnail {
        id: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Remove an image from its album
    Delete {
        #[arg(long)]
        album: String,
        #[arg(long)]
        image: String,
    },
}

#[derive(Subcommand)]
enum JobCommands {
    /// Show the current job status
    Status { id: String },
    /// Wait for a job to finish
    Wait {
        id: String,
        #[command(flatten)]
        polling: PollArgs,
    },
}

#[derive(Args)]
struct PollArgs {
    /// Delay between status checks in milliseconds.
    #[arg(long, default_value_t = 2000)]
    poll_interval_ms: u64,
    /// Upper bound on the delay when backing off.
    #[arg(long, default_value_t = 10_000)]
    max_interval_ms: u64,
    /// Give up after this many status checks.
    #[arg(long, default_value_t = 300)]
    max_attempts: u32,
    /// Use exponential backoff instead of a fixed interval.
    #[arg(long)]
    exponential: bool,
}

impl PollArgs {
    fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval_ms: self.poll_interval_ms,
            max_interval_ms: self.max_interval_ms,
            max_attempts: self.max_attempts,
            backoff: if self.exponential {
                Backoff::Exponential
            } else {
                Backoff::Fixed
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(&ObservabilityConfig {
        log_level: cli.log_level.clone(),
        ..ObservabilityConfig::default()
    });

    let client = Arc::new(BackendClient::new(&ClientConfig {
        base_url: cli.url,
        path_prefix: cli.prefix,
        timeout_secs: cli.timeout_secs,
    })?);

    match cli.command {
        Commands::Albums(cmd) => match cmd {
            AlbumCommands::List => print_json(&client.list_albums().await?)?,
            AlbumCommands::Get { id } => print_json(&client.get_album(&id).await?)?,
            AlbumCommands::Create { name } => print_json(&client.create_album(&name).await?)?,
            AlbumCommands::Delete { id } => print_json(&client.delete_album(&id).await?)?,
        },
        Commands::Image(cmd) => match cmd {
            ImageCommands::Get { album, image, out } => {
                let bytes = client.get_image(&album, &image).await?;
                tokio::fs::write(&out, &bytes).await?;
                println!("Wrote {} bytes to {}", bytes.len(), out.display());
            }
            ImageCommands::Thumbnail { id, out } => {
                let bytes = client.get_thumbnail(&id).await?;
                tokio::fs::write(&out, &bytes).await?;
                println!("Wrote {} bytes to {}", bytes.len(), out.display());
            }
            ImageCommands::Delete { album, image } => {
                print_json(&client.delete_image(&album, &image).await?)?
            }
        },
        Commands::Upload {
            album,
            file,
            polling,
        } => {
            let image = ImageUpload::from_path(&file).await?;
            let uploader = Uploader::new(client, polling.policy());
            let ctrl_c = CtrlC::install();

            let result = uploader
                .upload_and_wait(&album, &image, print_progress, &ctrl_c.token)
                .await?;
            print_json(&result)?;
        }
        Commands::Job(cmd) => match cmd {
            JobCommands::Status { id } => {
                let poller = JobPoller::new(client, PollPolicy::default());
                print_json(&poller.poll(&JobId::new(id)).await?)?;
            }
            JobCommands::Wait { id, polling } => {
                let poller = JobPoller::new(client, polling.policy());
                let ctrl_c = CtrlC::install();

                let result = poller
                    .wait_for(
                        &JobId::new(id),
                        |snapshot| eprintln!("status: {}", snapshot.overall_status),
                        &ctrl_c.token,
                    )
                    .await?;
                print_json(&result)?;
            }
        },
    }

    Ok(())
}

/// Cancellation token tripped by Ctrl-C. The listener task is aborted on drop.
struct CtrlC {
    token: CancellationToken,
    listener: JoinHandle<()>,
}

impl CtrlC {
    fn install() -> Self {
        let token = CancellationToken::new();
        let trip = token.clone();
        let listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trip.cancel();
            }
        });
        Self { token, listener }
    }
}

impl Drop for CtrlC {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

fn print_progress(progress: UploadProgress) {
    match progress {
        UploadProgress::Uploading => eprintln!("uploading..."),
        UploadProgress::Queued(job_id) => eprintln!("queued as job {}", job_id),
        UploadProgress::Processing(status) => eprintln!("status: {}", status),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ctrl_c_listener_stops_with_guard() {
        let ctrl_c = CtrlC::install();
        let listener = ctrl_c.listener.abort_handle();
        assert!(!ctrl_c.token.is_cancelled());

        drop(ctrl_c);
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert!(listener.is_finished());
    }
}
