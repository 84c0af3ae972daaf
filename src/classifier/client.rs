//! Sends corrected categories to the dataset update endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::classifier::dataset::LabeledDescription;

/// The errors that may occur when sending a dataset update.
#[derive(Debug, thiserror::Error)]
pub enum DatasetUpdateError {
    /// The request could not be sent or timed out.
    #[error("could not send dataset update to {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The receiving server answered with a non-success status.
    #[error("dataset update to {url} was rejected with status {status}: {body}")]
    Rejected {
        url: String,
        status: u16,
        body: String,
    },
}

#[derive(Debug, Serialize)]
struct DatasetUpdateRequest<'a> {
    new_data: &'a LabeledDescription,
}

/// A fire-and-forget HTTP client for the dataset update endpoint.
#[derive(Debug, Clone)]
pub struct DatasetUpdateClient {
    http_client: Client,
    url: String,
}

impl DatasetUpdateClient {
    /// Create a client that posts updates to `url`, giving up on each request after `timeout`.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client could not be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    /// The URL updates are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post `example` as JSON `{"new_data": {"description": ..., "category": ...}}`.
    ///
    /// # Errors
    /// Returns a [DatasetUpdateError] if the request fails or is rejected.
    pub async fn send(&self, example: &LabeledDescription) -> Result<(), DatasetUpdateError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&DatasetUpdateRequest { new_data: example })
            .send()
            .await
            .map_err(|source| DatasetUpdateError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());

        Err(DatasetUpdateError::Rejected {
            url: self.url.clone(),
            status: status.as_u16(),
            body,
        })
    }

    /// Send `example` on a spawned task. Failures are logged and otherwise ignored.
    pub fn submit_in_background(&self, example: LabeledDescription) -> tokio::task::JoinHandle<()> {
        let client = self.clone();

        tokio::spawn(async move {
            match client.send(&example).await {
                Ok(()) => tracing::debug!(
                    "Sent dataset update for category \"{}\"",
                    example.category
                ),
                Err(error) => tracing::warn!("Dataset update failed: {error}"),
            }
        })
    }
}
