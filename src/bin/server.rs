use std::{
    env::{self},
    error::Error,
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AppConfig, AppState, ForestConfig, LogMailer, OwnershipPolicy, PaginationConfig,
    build_router, graceful_shutdown, logging_middleware, parse_daily_limit,
};

/// The web server for the expense tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// The labelled CSV file the category classifier is trained on.
    #[arg(long, default_value = "dataset.csv")]
    dataset_path: PathBuf,

    /// Where corrected category predictions are sent. Defaults to this server's own dataset
    /// update route.
    #[arg(long)]
    dataset_update_url: Option<String>,

    /// The daily limit for users who have not set their own.
    #[arg(long, default_value_t = 5000.0, value_parser = daily_limit_arg)]
    default_daily_limit: f64,

    /// The sender address of the daily limit notification.
    #[arg(long, default_value = "noreply@localhost")]
    email_from: String,

    /// The number of expenses shown per page.
    #[arg(long, default_value_t = 5)]
    page_size: u64,

    /// Seed for training the category classifier.
    #[arg(long, default_value_t = 42)]
    forest_seed: u64,

    /// Let any logged in user edit or delete any expense by ID.
    #[arg(long)]
    allow_cross_owner_edits: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    setup_logging()?;

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let secret = env::var("SECRET").map_err(|_| "The environment variable 'SECRET' must be set")?;

    let dataset_update_url = args
        .dataset_update_url
        .unwrap_or_else(|| format!("http://127.0.0.1:{}/api/update_dataset", args.port));

    let ownership_policy = if args.allow_cross_owner_edits {
        OwnershipPolicy::Unrestricted
    } else {
        OwnershipPolicy::Enforce
    };

    let config = AppConfig {
        cookie_secret: secret,
        local_timezone: args.timezone,
        pagination_config: PaginationConfig {
            page_size: args.page_size,
            ..Default::default()
        },
        dataset_path: args.dataset_path,
        forest_config: ForestConfig {
            seed: args.forest_seed,
            ..Default::default()
        },
        dataset_update_url: Some(dataset_update_url),
        default_daily_limit: args.default_daily_limit,
        email_from: args.email_from,
        ownership_policy,
    };

    let connection = Connection::open(&args.db_path)?;
    let state = AppState::new(connection, config, Arc::new(LogMailer))?;

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;

    Ok(())
}

fn daily_limit_arg(text: &str) -> Result<f64, String> {
    parse_daily_limit(text).ok_or_else(|| format!("{text:?} is not a number that is zero or more"))
}

fn setup_logging() -> Result<(), Box<dyn Error>> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are turned into responses.
        .on_failure(());

    router.layer(tracing_layer)
}
