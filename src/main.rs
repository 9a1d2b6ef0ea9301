use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use axiomai::config::load_settings;
use axiomai::kernel::controller::{Submission, SubmissionController};
use axiomai::outputs::console::ConsoleRenderer;
use axiomai::services::backend::BackendClient;

const BANNER: &str = "AXIOMAI :: retrieve -> generate -> validate -> verify";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings()?;

    // 1. Setup Logging (RUST_LOG wins over the configured filter)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Boot screen: once per process
    println!("{}", BANNER);

    // 2. Backend + health probe (informational only)
    let client = BackendClient::from_settings(&settings);
    match client.health().await {
        Ok(health) => tracing::info!(service = %health.service, status = %health.status, "backend reachable"),
        Err(e) => tracing::warn!(backend = client.base_url(), error = %e, "backend health check failed"),
    }

    // 3. Controller loop
    let controller = SubmissionController::new(Arc::new(client), settings.controller_config());
    let mut handle = controller.handle();
    tokio::spawn(controller.run());

    let mut renderer = ConsoleRenderer::new(std::io::stdout());
    renderer.render(&handle.snapshot())?;

    // 4. Stdin is the query box
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle.submit(line).await? {
                    Submission::Accepted { generation } => tracing::debug!(generation, "submitted"),
                    Submission::Rejected(reason) => tracing::debug!(?reason, "input ignored"),
                }
            }
            snapshot = handle.changed() => {
                renderer.render(&snapshot?)?;
            }
        }
    }

    // Input closed: let the outstanding request finish before exiting
    let last = handle.settled().await?;
    renderer.render(&last)?;
    Ok(())
}
