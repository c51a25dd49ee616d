//! JSON API over axum.
//!
//! Public routes take bookings and payment callbacks. Everything under
//! `/admin` requires `Authorization: Bearer <admin token>`.

use crate::application::desk::BuddyDesk;
use crate::error::{BuddyError, Result};
use axum::Router;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod error;
pub mod handlers;

/// Shared state handed to every handler.
pub struct AppState {
    pub desk: BuddyDesk,
    pub admin_token: String,
}

impl AppState {
    pub fn new(desk: BuddyDesk, admin_token: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            desk,
            admin_token: admin_token.into(),
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    let admin = Router::new()
        .route(
            "/advisors",
            get(handlers::list_advisors).post(handlers::create_advisor),
        )
        .route(
            "/advisors/{id}",
            get(handlers::get_advisor)
                .put(handlers::update_advisor)
                .delete(handlers::delete_advisor),
        )
        .route("/requests", get(handlers::list_requests))
        .route("/requests/{id}", get(handlers::get_request))
        .route("/requests/{id}/cancel", post(handlers::cancel_request))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/buddy/requests", post(handlers::book))
        .route(
            "/buddy/requests/{id}/payments",
            post(handlers::initiate_payment),
        )
        .route("/buddy/payments/verify", post(handlers::verify_payment))
        .nest("/admin", admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> std::result::Result<Response, BuddyError> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == state.admin_token);

    if !authorized {
        warn!(path = %request.uri().path(), "rejected admin request");
        return Err(BuddyError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// Binds `port` and serves until Ctrl+C or SIGTERM.
pub async fn serve(state: Arc<AppState>, port: u16) -> Result<()> {
    let app = build_router(state);

    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
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
