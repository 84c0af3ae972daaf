//! Defines the endpoint for updating an existing expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    classifier::CategoryClassifier,
    database_id::ExpenseID,
    endpoints,
    expense::{
        core::update_expense,
        create_endpoint::render_form_error,
        form::{ExpenseForm, ExpenseFormAction},
        ownership::OwnershipPolicy,
    },
    timezone::local_today,
};

/// The state needed to edit an expense.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub classifier: CategoryClassifier,
    pub ownership_policy: OwnershipPolicy,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            classifier: state.classifier.clone(),
            ownership_policy: state.ownership_policy,
        }
    }
}

/// A route handler for updating an expense, redirects to the expenses view on success.
pub async fn edit_expense_endpoint(
    State(state): State<EditExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let mut data = match form.validate(today) {
        Ok(data) => data,
        Err(error) => {
            return render_form_error(
                &state.db_connection,
                ExpenseFormAction::Edit(expense_id),
                &form,
                today,
                error,
            )
            .unwrap_or_else(Error::into_alert_response);
        }
    };

    if data.category.is_empty() {
        data.category = match state.classifier.predict(data.description.clone()).await {
            Ok(category) => category,
            Err(error) => {
                tracing::error!("Could not predict category for expense {expense_id}: {error}");
                return error.into_alert_response();
            }
        };
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = update_expense(
        expense_id,
        state.ownership_policy.scope(user_id),
        &data,
        &connection,
    ) {
        tracing::error!("Could not update expense {expense_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(format!("{}?updated=true", endpoints::EXPENSES_VIEW)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
