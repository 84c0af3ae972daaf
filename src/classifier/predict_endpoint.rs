//! Suggests a category while the user fills in the expense form.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::get_all_categories,
    classifier::CategoryClassifier,
    expense::{ExpenseForm, category_field},
};

/// The state needed for predicting a category.
#[derive(Debug, Clone)]
pub struct PredictCategoryState {
    pub classifier: CategoryClassifier,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for PredictCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            classifier: state.classifier.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category field, filled in with the predicted category.
///
/// A category the user already typed is kept as is, and a blank description
/// leaves the field unchanged. The prediction is also stored in the hidden
/// `initial_predicted_category` input so that corrections can be detected on submit.
pub async fn predict_category_endpoint(
    State(state): State<PredictCategoryState>,
    Form(mut form): Form<ExpenseForm>,
) -> Response {
    if form.category.trim().is_empty() && !form.description.trim().is_empty() {
        match state.classifier.predict(form.description.clone()).await {
            Ok(category) => {
                form.category = category.clone();
                form.initial_predicted_category = category;
            }
            Err(error) => return error.into_alert_response(),
        }
    }

    let categories = match state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| get_all_categories(&connection))
    {
        Ok(categories) => categories,
        Err(error) => {
            tracing::error!("Could not get categories: {error}");
            return error.into_alert_response();
        }
    };

    category_field(&form, &categories).into_response()
}
