use super::{routes, AppState};
use crate::shared::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Builds the router for the audit API
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/applications", get(routes::list_applications))
        .route("/applications/expiring", get(routes::list_expiring))
        .route("/check-now", post(routes::check_now))
        .route("/test-services", get(routes::test_services))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Serves `router` on `addr` until `shutdown` resolves
pub async fn serve<S>(router: Router, addr: &str, shutdown: S) -> Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "credwatch API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("credwatch API stopped");
    Ok(())
}
