use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    database_id::ExpenseID,
    expense::{core::delete_expense, ownership::OwnershipPolicy},
};

/// The state needed to delete an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    db_connection: Arc<Mutex<Connection>>,
    ownership_policy: OwnershipPolicy,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            ownership_policy: state.ownership_policy,
        }
    }
}

/// A route handler for deleting an expense.
///
/// On success the body is empty apart from an out-of-band success alert, so
/// that HTMX removes the table row and shows the alert.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_expense(
        expense_id,
        state.ownership_policy.scope(user_id),
        &connection,
    ) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => html! {
            div id="alert-container" hx-swap-oob="innerHTML"
            {
                (Alert::Success {
                    message: "Expense removed".to_owned(),
                    details: String::new(),
                }.into_html())
            }
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not delete expense {expense_id}: {error}");
            error.into_alert_response()
        }
    }
}
