//! Pitchpipe server binary.

use std::sync::Arc;

use pitchpipe::config::{load_config, print_config};
use pitchpipe::infrastructure::adapters::{SineSynthesizer, WavTranscoder};
use pitchpipe::infrastructure::http::{AppState, HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    let log_filter = format!(
        "{},pitchpipe={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Pitchpipe - note synthesis API");
    print_config(&config);

    let synthesizer = Arc::new(SineSynthesizer::new(config.audio.amplitude));
    let transcoder = Arc::new(WavTranscoder::new());

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(&config, synthesizer, transcoder);

    let server = HttpServer::new(server_config, state);

    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
