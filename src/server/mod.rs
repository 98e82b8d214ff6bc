use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::storage::SqliteStore;

pub mod routes;

/// Server state
pub struct AppState {
    pub store: SqliteStore,
    pub popular_limit: usize,
}

impl AppState {
    pub fn new(store: SqliteStore, popular_limit: usize) -> Arc<Self> {
        Arc::new(Self { store, popular_limit })
    }
}

/// Build the router. Like/dislike only accept POST; other verbs get 405.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::random_quote))
        .route("/health", get(routes::health))
        .route("/quotes", post(routes::add_quote))
        .route(
            "/quotes/{id}",
            get(routes::get_quote).put(routes::edit_quote).delete(routes::delete_quote),
        )
        .route("/quotes/{id}/like", post(routes::like_quote))
        .route("/quotes/{id}/dislike", post(routes::dislike_quote))
        .route("/popular", get(routes::popular))
        .route("/sources", get(routes::sources))
        .route("/search", get(routes::search))
        .route("/stats", get(routes::stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = app_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
