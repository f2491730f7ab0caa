//! HTTP API.
//!
//! # Routes
//!
//! - `GET /health`
//! - `GET|POST /tickets`, `GET /tickets/:id`, `PATCH /tickets/:id/status`
//! - `GET|POST /tickets/:id/messages`
//! - `GET|POST /users`, `GET /users/:id`
//! - `POST /surveys`, `GET /surveys/stats`, `GET /surveys/:token`,
//!   `POST /surveys/:token/submit`
//! - `GET|POST /departments`, `GET /departments/:id`
//! - `GET|POST /sla-configs`, `GET /sla-configs/:priority`, `GET /tickets/:id/sla`
//! - `GET|POST /saved-replies`, `GET /saved-replies/:id`
//! - `GET|POST /kb/articles`, `GET /kb/articles/:id`
//!
//! Services are synchronous, so handlers run them on the blocking pool.

mod departments;
mod error;
mod health;
mod knowledge_base;
mod saved_replies;
mod sla;
mod surveys;
mod tickets;
mod users;

#[cfg(test)]
mod tests;

pub use error::AppError;

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::future::IntoFuture;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::app::Services;

pub fn router(services: Services) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/tickets",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route("/tickets/:id", get(tickets::get_ticket))
        .route("/tickets/:id/status", patch(tickets::update_status))
        .route(
            "/tickets/:id/messages",
            get(tickets::list_messages).post(tickets::add_message),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/:id", get(users::get_user))
        .route("/surveys", post(surveys::create_survey))
        .route("/surveys/stats", get(surveys::stats))
        .route("/surveys/:token", get(surveys::get_survey))
        .route("/surveys/:token/submit", post(surveys::submit_survey))
        .route(
            "/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route("/departments/:id", get(departments::get_department))
        .route("/sla-configs", get(sla::list_configs).post(sla::set_config))
        .route("/sla-configs/:priority", get(sla::get_config))
        .route("/tickets/:id/sla", get(sla::ticket_status))
        .route(
            "/saved-replies",
            get(saved_replies::list_saved_replies).post(saved_replies::create_saved_reply),
        )
        .route("/saved-replies/:id", get(saved_replies::get_saved_reply))
        .route(
            "/kb/articles",
            get(knowledge_base::list_articles).post(knowledge_base::create_article),
        )
        .route("/kb/articles/:id", get(knowledge_base::get_article))
        .with_state(services)
        .layer(TraceLayer::new_for_http())
}

/// Runs a synchronous service call off the async executor.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(AppError::from),
        Err(join_error) => Err(AppError::internal("Request handler failed")
            .with_source(anyhow::Error::new(join_error))),
    }
}

/// Serves until Ctrl+C or SIGTERM, then gives in-flight requests `grace`
/// to finish.
///
/// # Errors
///
/// Returns an error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, services: Services, grace: Duration) -> anyhow::Result<()> {
    let (stop_tx, mut stop_rx) = tokio::sync::watch::channel(false);

    let server = axum::serve(listener, router(services)).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });
    let server = server.into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.map_err(Into::into),
        _ = stop_rx.changed() => {}
    }

    info!(grace_secs = grace.as_secs(), "Draining in-flight requests");
    tokio::select! {
        result = &mut server => {
            result?;
            info!("Server stopped");
        }
        () = tokio::time::sleep(grace) => {
            warn!("Shutdown timeout elapsed; dropping remaining connections");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }
}
