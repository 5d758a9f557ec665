use std::sync::Arc;

use opmet_query::{options::Options, report_service, reporting, serve_http};
use tokio::{signal::unix::SignalKind, sync::broadcast};
use tracing_appender::rolling::Rotation;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    reporting::setup_error_hooks()?;
    let options = Options::initialize().await?;

    let _reporting_guard = reporting::setup_logging(&reporting::Options {
        data_dir: options.data_dir.clone(),
        log_rotation: Rotation::DAILY,
    })?;

    let (shutdown_tx, serve_http_shutdown_rx) = broadcast::channel::<()>(1);

    let ctrl_c_shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen to ctrl-c or SIGINT event");
        tracing::warn!("ctrl-c or SIGINT event detected, broadcasting shutdown");
        ctrl_c_shutdown_tx
            .send(())
            .expect("failed to send shutdown broadcast");
    });

    let sigterm_shutdown_tx = shutdown_tx;
    tokio::spawn(async move {
        tokio::signal::unix::signal(SignalKind::terminate())
            .expect("failed to create SIGTERM signal listener")
            .recv()
            .await
            .expect("failed to listen to SIGTERM signal");
        tracing::warn!("SIGTERM signal detected, broadcasting shutdown");
        sigterm_shutdown_tx
            .send(())
            .expect("failed to send shutdown broadcast");
    });

    let http_client = reqwest::Client::new();
    let report_service = Arc::new(report_service::Gateway::new(
        http_client,
        options.endpoint.clone(),
    ));

    serve_http::serve_http(
        serve_http_shutdown_rx,
        serve_http::Options {
            listen_address: options.listen_address,
            report_service,
        },
    )
    .await
}
