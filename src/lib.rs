//! An expense tracker web app for recording what you spend, sorting it into
//! categories and keeping an eye on how much goes out each day.
//!
//! This library provides a REST API that directly serves HTML pages, plus a
//! handful of JSON endpoints for search, category summaries and growing the
//! dataset used by the category classifier.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod category;
mod classifier;
mod database_id;
mod db;
mod endpoints;
mod error;
mod expense;
mod html;
mod internal_server_error;
mod limit;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod preferences;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppConfig, AppState};
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_username,
    update_password,
};
pub use category::{CategoryName, create_category};
pub use classifier::{CategoryClassifier, ClassifierError, DatasetUpdateClient, ForestConfig};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::OwnershipPolicy;
pub use limit::{Email, LogMailer, MailError, Mailer};
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use preferences::parse_daily_limit;
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not listen for ctrl+c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("Could not listen for the terminate signal: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
