//! Training the category model and keeping a fitted copy around between requests.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
    time::SystemTime,
};

use crate::{
    Error,
    classifier::{
        ClassifierError,
        dataset::load_dataset,
        forest::{ForestConfig, RandomForest},
        preprocess::preprocess_text,
        tfidf::TfidfVectorizer,
    },
};

/// A fitted vectorizer and forest.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    vectorizer: TfidfVectorizer,
    forest: RandomForest,
}

impl TrainedModel {
    /// Predict the category of a raw, unprocessed description.
    pub fn predict(&self, text: &str) -> String {
        let vector = self.vectorizer.transform(&preprocess_text(text));

        self.forest.predict(&vector).to_owned()
    }
}

/// Train a model on the CSV dataset at `dataset_path`.
///
/// # Errors
/// Returns a [ClassifierError] if the dataset cannot be loaded, is empty, has only stopwords,
/// or has fewer than two categories.
pub fn train_model(
    dataset_path: &Path,
    config: ForestConfig,
) -> Result<TrainedModel, ClassifierError> {
    let rows = load_dataset(dataset_path)?;

    if rows.is_empty() {
        return Err(ClassifierError::EmptyDataset);
    }

    let (descriptions, labels): (Vec<String>, Vec<String>) = rows
        .into_iter()
        .map(|row| (preprocess_text(&row.description), row.category))
        .unzip();

    let first_label = &labels[0];
    if labels.iter().all(|label| label == first_label) {
        return Err(ClassifierError::SingleClass(first_label.clone()));
    }

    let vectorizer = TfidfVectorizer::fit(&descriptions)?;
    let vectors: Vec<_> = descriptions
        .iter()
        .map(|description| vectorizer.transform(description))
        .collect();
    let forest = RandomForest::fit(&vectors, &labels, vectorizer.feature_count(), config);

    tracing::info!(
        "Trained category classifier on {} examples with {} features and {} categories",
        labels.len(),
        vectorizer.feature_count(),
        forest.classes().len()
    );

    Ok(TrainedModel { vectorizer, forest })
}

#[derive(Debug)]
struct CachedModel {
    model: Arc<TrainedModel>,
    dataset_modified: Option<SystemTime>,
}

#[derive(Debug)]
struct ClassifierInner {
    dataset_path: PathBuf,
    config: ForestConfig,
    cache: RwLock<Option<CachedModel>>,
}

/// Predicts expense categories from descriptions.
///
/// The model is trained on first use and then reused until [CategoryClassifier::invalidate]
/// is called or the dataset file's modification time changes. Cloning is cheap and clones
/// share the cached model.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    inner: Arc<ClassifierInner>,
}

impl CategoryClassifier {
    /// Create a classifier for the dataset at `dataset_path`. Nothing is trained yet.
    pub fn new(dataset_path: impl Into<PathBuf>, config: ForestConfig) -> Self {
        Self {
            inner: Arc::new(ClassifierInner {
                dataset_path: dataset_path.into(),
                config,
                cache: RwLock::new(None),
            }),
        }
    }

    /// The CSV file the classifier trains on.
    pub fn dataset_path(&self) -> &Path {
        &self.inner.dataset_path
    }

    fn dataset_modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.inner.dataset_path)
            .and_then(|metadata| metadata.modified())
            .ok()
    }

    /// Get the cached model, training a new one if there is none or the dataset changed.
    ///
    /// This blocks while training, call it from a blocking thread.
    ///
    /// # Errors
    /// Returns a [ClassifierError] if a new model is needed and training fails.
    pub fn model(&self) -> Result<Arc<TrainedModel>, ClassifierError> {
        let dataset_modified = self.dataset_modified();

        // The cache only ever holds a fully trained model, so a poisoned lock is still usable.
        {
            let cache = self
                .inner
                .cache
                .read()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(cached) = cache
                .as_ref()
                .filter(|cached| cached.dataset_modified == dataset_modified)
            {
                return Ok(cached.model.clone());
            }
        }

        let mut cache = self
            .inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        // Another thread may have trained while this one waited for the write lock.
        if let Some(cached) = cache
            .as_ref()
            .filter(|cached| cached.dataset_modified == dataset_modified)
        {
            return Ok(cached.model.clone());
        }

        tracing::debug!(
            "Training category classifier from {}",
            self.inner.dataset_path.display()
        );
        let model = Arc::new(train_model(&self.inner.dataset_path, self.inner.config)?);

        *cache = Some(CachedModel {
            model: model.clone(),
            dataset_modified,
        });

        Ok(model)
    }

    /// Predict the category for `description`, training the model first if needed.
    ///
    /// # Errors
    /// Returns a [ClassifierError] if the model could not be trained.
    pub fn predict_category_from_description(
        &self,
        description: &str,
    ) -> Result<String, ClassifierError> {
        Ok(self.model()?.predict(description))
    }

    /// Drop the cached model so that the next prediction retrains it.
    pub fn invalidate(&self) {
        tracing::debug!("Invalidating cached category classifier");
        *self
            .inner
            .cache
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Retrain the model now.
    ///
    /// # Errors
    /// Returns a [ClassifierError] if the model could not be trained. The old model is
    /// discarded either way.
    pub fn reload(&self) -> Result<(), ClassifierError> {
        self.invalidate();
        self.model().map(|_| ())
    }

    /// Predict the category for `description` on the blocking thread pool.
    ///
    /// # Errors
    /// Returns [Error::Classifier] if training fails or [Error::TaskFailed] if the task panicked.
    pub async fn predict(&self, description: String) -> Result<String, Error> {
        let classifier = self.clone();

        tokio::task::spawn_blocking(move || {
            classifier.predict_category_from_description(&description)
        })
        .await
        .map_err(|error| {
            tracing::error!("Category prediction task failed: {error}");
            Error::TaskFailed(error.to_string())
        })?
        .map_err(Error::from)
    }
}
