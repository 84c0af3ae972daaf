//! Predicts an expense's category from its description.
//!
//! A TF-IDF vectorizer and random forest are trained on a labelled CSV dataset. The fitted model
//! is cached and retrained when the dataset changes, either through the update endpoint or by
//! editing the file directly.

mod client;
mod dataset;
mod forest;
mod model;
mod predict_endpoint;
mod preprocess;
mod tfidf;
mod update_dataset_endpoint;

pub use client::DatasetUpdateClient;
pub use dataset::LabeledDescription;
pub use forest::ForestConfig;
pub use model::CategoryClassifier;
pub use predict_endpoint::predict_category_endpoint;
pub use update_dataset_endpoint::update_dataset_endpoint;

#[cfg(test)]
pub(crate) use model::test_support::write_test_dataset;

/// The errors that may occur while loading the dataset or training the classifier.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClassifierError {
    /// The dataset file could not be opened or read.
    #[error("could not read the dataset at {path}: {reason}")]
    ReadDataset { path: String, reason: String },

    /// A row could not be appended to the dataset file.
    #[error("could not write to the dataset at {path}: {reason}")]
    WriteDataset { path: String, reason: String },

    /// The dataset header does not name a required column.
    #[error("the dataset has no \"{0}\" column")]
    MissingColumn(String),

    /// The dataset is not valid CSV.
    #[error("the dataset is malformed: {0}")]
    MalformedDataset(String),

    /// The dataset has a header but no rows.
    #[error("the dataset has no rows")]
    EmptyDataset,

    /// Every description in the dataset reduced to nothing after removing stopwords.
    #[error("the dataset descriptions contain no usable words")]
    EmptyVocabulary,

    /// Every row has the same category, so there is nothing to choose between.
    #[error("the dataset only has the category \"{0}\"")]
    SingleClass(String),
}
