use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snippet_keeper::{
    create_router, AppState, AudioBackendFactory, AudioSource, Config, JsonManifestSink,
    RecordingController,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snippet-keeper")]
#[command(about = "Record continuously and keep only the loudest snippets")]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/snippet-keeper")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP control API
    Serve,

    /// Record one session and print its manifest
    Record {
        /// WAV file to replay (defaults to the configured input or the tone generator)
        #[arg(short, long)]
        input: Option<String>,

        /// Number of snippets to keep
        #[arg(short = 'n', long)]
        snippets: Option<usize>,

        /// Chunk duration in seconds
        #[arg(long)]
        chunk_secs: Option<u32>,

        /// Pace file replay in real time
        #[arg(long)]
        realtime: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Recordings directory: {}", cfg.recordings_dir().display());

    match cli.command {
        Command::Serve => serve(cfg).await,
        Command::Record {
            input,
            snippets,
            chunk_secs,
            realtime,
        } => record(cfg, input, snippets, chunk_secs, realtime).await,
    }
}

async fn serve(cfg: Config) -> Result<()> {
    let manifests = Arc::new(JsonManifestSink::new(cfg.manifests_dir()));
    let controller = Arc::new(RecordingController::new(cfg.session_config(), manifests.clone()));

    let state = AppState::new(
        Arc::clone(&controller),
        cfg.backend_config(),
        cfg.audio.input.clone(),
        manifests,
    );

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    if let Some(report) = controller.stop().await {
        info!(
            "Drained session {} on shutdown ({} snippets)",
            report.session.id, report.session.accepted_count
        );
    }

    Ok(())
}

async fn record(
    cfg: Config,
    input: Option<String>,
    snippets: Option<usize>,
    chunk_secs: Option<u32>,
    realtime: bool,
) -> Result<()> {
    let mut session_config = cfg.session_config();
    if let Some(count) = snippets {
        session_config.snippet_count = count;
    }
    if let Some(secs) = chunk_secs {
        session_config.chunk_duration_secs = secs;
    }

    let source = AudioSource::from_input(input.or(cfg.audio.input.clone()).as_deref());
    let mut backend_config = cfg.backend_config();
    backend_config.realtime = realtime || source == AudioSource::Generator;

    let backend = AudioBackendFactory::create(source, backend_config)?;

    let sink = Arc::new(JsonManifestSink::new(cfg.manifests_dir()));
    let controller = RecordingController::new(session_config, sink);
    let session = controller.start(backend).await?;

    info!("Recording {} (Ctrl-C to stop)", session.id);

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let report = controller.wait_or_stop(ctrl_c).await;

    match report {
        Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
        None => warn!("Session ended without a report"),
    }

    Ok(())
}
