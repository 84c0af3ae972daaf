//! Receives labelled examples and adds them to the classifier's dataset.

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{
    AppState,
    classifier::{
        CategoryClassifier, ClassifierError,
        dataset::{LabeledDescription, append_example},
    },
};

/// The state needed for updating the dataset.
#[derive(Debug, Clone)]
pub struct UpdateDatasetState {
    pub classifier: CategoryClassifier,
}

impl FromRef<AppState> for UpdateDatasetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            classifier: state.classifier.clone(),
        }
    }
}

/// The JSON body of a dataset update.
#[derive(Debug, Deserialize)]
pub struct UpdateDatasetRequest {
    pub new_data: LabeledDescription,
}

/// Append the example in the request body to the dataset and drop the cached model.
///
/// Responds with 204 on success and 400 if the description or category is blank.
pub async fn update_dataset_endpoint(
    State(state): State<UpdateDatasetState>,
    Json(request): Json<UpdateDatasetRequest>,
) -> Response {
    let example = LabeledDescription {
        description: request.new_data.description.trim().to_owned(),
        category: request.new_data.category.trim().to_owned(),
    };

    if example.description.is_empty() || example.category.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Both description and category are required",
        )
            .into_response();
    }

    let classifier = state.classifier.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<(), ClassifierError> {
        append_example(classifier.dataset_path(), &example)?;
        classifier.invalidate();
        tracing::info!(
            "Added \"{}\" as an example of \"{}\" to the dataset",
            example.description,
            example.category
        );
        Ok(())
    })
    .await;

    match result {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(error)) => {
            tracing::error!("Could not update the dataset: {error}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(error) => {
            tracing::error!("Dataset update task failed: {error}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{Json, extract::State, http::StatusCode};

    use crate::classifier::{
        CategoryClassifier, ForestConfig, LabeledDescription, dataset::load_dataset,
        write_test_dataset,
    };

    use super::{UpdateDatasetRequest, UpdateDatasetState, update_dataset_endpoint};

    fn request(description: &str, category: &str) -> Json<UpdateDatasetRequest> {
        Json(UpdateDatasetRequest {
            new_data: LabeledDescription {
                description: description.to_owned(),
                category: category.to_owned(),
            },
        })
    }

    #[tokio::test]
    async fn appends_row_and_invalidates_model() {
        let dataset = write_test_dataset();
        let classifier = CategoryClassifier::new(dataset.path(), ForestConfig::default());
        let old_model = classifier.model().unwrap();
        let row_count = load_dataset(dataset.path()).unwrap().len();
        let state = UpdateDatasetState {
            classifier: classifier.clone(),
        };

        let response =
            update_dataset_endpoint(State(state), request(" Cinema tickets ", "Entertainment"))
                .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let rows = load_dataset(dataset.path()).unwrap();
        assert_eq!(rows.len(), row_count + 1);
        assert_eq!(
            rows.last(),
            Some(&LabeledDescription {
                description: "Cinema tickets".to_owned(),
                category: "Entertainment".to_owned(),
            })
        );
        assert!(!Arc::ptr_eq(&old_model, &classifier.model().unwrap()));
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let dataset = write_test_dataset();
        let row_count = load_dataset(dataset.path()).unwrap().len();
        let state = UpdateDatasetState {
            classifier: CategoryClassifier::new(dataset.path(), ForestConfig::default()),
        };

        let response = update_dataset_endpoint(State(state.clone()), request("", "Food")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = update_dataset_endpoint(State(state), request("Pizza", "  ")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(load_dataset(dataset.path()).unwrap().len(), row_count);
    }
}
