//! Implements a struct that holds the state of the REST server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::DEFAULT_COOKIE_DURATION,
    classifier::{CategoryClassifier, DatasetUpdateClient, ForestConfig},
    db::initialize,
    expense::OwnershipPolicy,
    limit::Mailer,
    pagination::PaginationConfig,
};

/// How long a dataset update request may take before it is abandoned.
const DATASET_UPDATE_TIMEOUT: StdDuration = StdDuration::from_secs(5);

/// The settings the server is started with.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The secret used to derive the private cookie key.
    pub cookie_secret: String,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
    /// The labelled CSV file the category classifier is trained on.
    pub dataset_path: PathBuf,
    pub forest_config: ForestConfig,
    /// Where corrected category predictions are posted. `None` disables the updates.
    pub dataset_update_url: Option<String>,
    /// The daily limit for users who have not set their own.
    pub default_daily_limit: f64,
    /// The sender address of notification emails.
    pub email_from: String,
    pub ownership_policy: OwnershipPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cookie_secret: String::new(),
            local_timezone: "Etc/UTC".to_owned(),
            pagination_config: PaginationConfig::default(),
            dataset_path: PathBuf::from("dataset.csv"),
            forest_config: ForestConfig::default(),
            dataset_update_url: None,
            default_daily_limit: 5000.0,
            email_from: "noreply@localhost".to_owned(),
            ownership_policy: OwnershipPolicy::default(),
        }
    }
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Suggests categories from expense descriptions.
    pub classifier: CategoryClassifier,

    /// Sends corrected predictions back to the dataset, if configured.
    pub dataset_update_client: Option<DatasetUpdateClient>,

    /// Sends the daily limit notification.
    pub mailer: Arc<dyn Mailer>,

    /// Whether users may edit and delete each other's expenses.
    pub ownership_policy: OwnershipPolicy,

    /// The daily limit for users who have not set their own.
    pub default_daily_limit: f64,

    /// The sender address of notification emails.
    pub email_from: String,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// The classifier is trained lazily on the first prediction.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the HTTP
    /// client for dataset updates cannot be built.
    pub fn new(
        db_connection: Connection,
        config: AppConfig,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let dataset_update_client = config
            .dataset_update_url
            .map(|url| DatasetUpdateClient::new(url, DATASET_UPDATE_TIMEOUT))
            .transpose()
            .map_err(|error| Error::HttpClientError(error.to_string()))?;

        Ok(Self {
            cookie_key: create_cookie_key(&config.cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: config.local_timezone,
            pagination_config: config.pagination_config,
            db_connection: Arc::new(Mutex::new(db_connection)),
            classifier: CategoryClassifier::new(config.dataset_path, config.forest_config),
            dataset_update_client,
            mailer,
            ownership_policy: config.ownership_policy,
            default_daily_limit: config.default_daily_limit,
            email_from: config.email_from,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
