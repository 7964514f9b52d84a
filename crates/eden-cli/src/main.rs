//! Eden CLI - submit a creation and watch its progress on the terminal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use eden_client::{ContentStore, GatewayClient};
use eden_core::{
    EdenClipXSettings, GeneratorConfig, OracleSettings, SourceContext, StableDiffusionSettings,
};
use eden_monitor::{MessageRef, MonitorConfig, ProgressMonitor};
use eden_transcode::FfmpegTranscoder;

mod sink;

use sink::TerminalSink;

/// Eden CLI - submit a creation and watch it complete
#[derive(Parser)]
#[command(name = "eden")]
#[command(about = "Submit an Eden creation and watch its progress", long_about = None)]
struct Cli {
    /// Prompt text for the creation
    prompt: String,

    /// Gateway base URL
    #[arg(long, default_value = "http://localhost:5656")]
    gateway_url: String,

    /// Content store base URL
    #[arg(long, default_value = "http://localhost:9000/creations")]
    content_url: String,

    /// Generator to run
    #[arg(short, long, value_enum, default_value = "eden-clipx")]
    generator: Generator,

    /// Seconds between status polls
    #[arg(long, default_value_t = 2)]
    poll_interval_secs: u64,

    /// Convert a video result to a looping GIF instead of saving the clip
    #[arg(long)]
    gif: bool,

    /// Give up after this many seconds without a terminal status
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Directory to save received media into
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Output width (stable-diffusion only)
    #[arg(long, default_value_t = 512)]
    width: u32,

    /// Output height (stable-diffusion only)
    #[arg(long, default_value_t = 512)]
    height: u32,

    /// ffmpeg executable used for GIF conversion
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg_path: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Generator {
    EdenClipx,
    StableDiffusion,
    Oracle,
}

impl Cli {
    fn generator_config(&self) -> GeneratorConfig {
        match self.generator {
            Generator::EdenClipx => {
                GeneratorConfig::EdenClipX(EdenClipXSettings::new(self.prompt.as_str()))
            }
            Generator::StableDiffusion => GeneratorConfig::StableDiffusion(
                StableDiffusionSettings::new(self.width, self.height, self.prompt.as_str()),
            ),
            Generator::Oracle => {
                GeneratorConfig::Oracle(OracleSettings::new(self.prompt.as_str()))
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let gateway = GatewayClient::new(&cli.gateway_url);
    let config = cli.generator_config();
    let source = SourceContext::new("cli");

    let receipt = gateway.submit(&source, &config).await?;
    info!(
        task_id = %receipt.task_id,
        generator = %receipt.generator,
        "Creation submitted"
    );

    let mut monitor_config = MonitorConfig::default()
        .with_poll_interval(Duration::from_secs(cli.poll_interval_secs.max(1)))
        .with_animated_variant(cli.gif);
    if let Some(secs) = cli.timeout_secs {
        monitor_config = monitor_config.with_max_run_duration(Duration::from_secs(secs));
    }

    let monitor = ProgressMonitor::new(
        Arc::new(gateway.status_source(receipt.generator)),
        Arc::new(ContentStore::new(&cli.content_url)),
        Arc::new(FfmpegTranscoder::new(cli.ffmpeg_path.as_str())),
        Arc::new(TerminalSink::new(&cli.out_dir)),
        monitor_config,
    );

    // Ctrl-c cancels the run at the next opportunity.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            signal_cancel.cancel();
        }
    });

    let outcome = monitor
        .run(&receipt.task_id, &MessageRef::new("terminal"), cancel)
        .await;

    info!(outcome = %outcome, "Run finished");
    if !outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
