//! HTTP endpoint exposing the gauge registry for scraping

use std::io;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::TlsFiles;
use crate::metrics::registry::{GaugeRegistry, TEXT_FORMAT_CONTENT_TYPE};

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Metrics endpoint failed: {0}")]
    Io(#[from] io::Error),

    #[error("Background task stopped: {0}")]
    TaskStopped(String),
}

/// Create the router serving `registry` at `path`
pub fn router(registry: Arc<GaugeRegistry>, path: &str) -> Router {
    Router::new()
        .route(path, get(render_metrics))
        .with_state(registry)
}

async fn render_metrics(State(registry): State<Arc<GaugeRegistry>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, TEXT_FORMAT_CONTENT_TYPE)],
        registry.render(),
    )
}

/// Serve `router` on `listen` until the process stops, over https when
/// `tls` is given
pub async fn serve(listen: &str, tls: Option<TlsFiles<'_>>, router: Router) -> io::Result<()> {
    match tls {
        Some(tls) => serve_tls(listen, tls, router).await,
        None => {
            let listener = tokio::net::TcpListener::bind(listen).await?;
            info!("serving http on {}", listen);
            axum::serve(listener, router).await
        }
    }
}

/// Serve like [`serve`] for as long as `task` runs
///
/// The task is expected to run forever, so its end, including a panic, stops
/// serving with an error instead of exposing metrics nobody updates anymore.
pub async fn serve_alongside(
    listen: &str,
    tls: Option<TlsFiles<'_>>,
    router: Router,
    task: JoinHandle<()>,
) -> Result<(), ServeError> {
    tokio::select! {
        served = serve(listen, tls, router) => Ok(served?),
        joined = task => Err(ServeError::TaskStopped(match joined {
            Ok(()) => "returned".to_string(),
            Err(e) => e.to_string(),
        })),
    }
}

async fn serve_tls(listen: &str, tls: TlsFiles<'_>, router: Router) -> io::Result<()> {
    let config = RustlsConfig::from_pem_file(tls.cert, tls.key).await?;
    let addr = tokio::net::lookup_host(listen)
        .await?
        .next()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address for {}", listen),
            )
        })?;

    info!("serving https on {}", listen);
    axum_server::bind_rustls(addr, config)
        .serve(router.into_make_service())
        .await
}
