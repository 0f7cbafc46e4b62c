use anyhow::Result;
use axum::serve;
use tokio::{net::TcpListener, signal, time::Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let start = Instant::now();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = fake_backend::create_app();

    let port = std::env::var("API_PORT").unwrap_or("5001".to_string());
    let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!("Listening on {}/api", listener.local_addr()?);

    let shutdown = async move {
        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut term) => {
                    term.recv().await;
                }
                Err(err) => {
                    tracing::warn!("no SIGTERM handler: {err}");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = signal::ctrl_c() => {},
            _ = terminate => {},
        }
        info!("Shutting down gracefully... in {:?}", start.elapsed());
    };

    serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
