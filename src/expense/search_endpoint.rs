//! The JSON endpoint behind the search box on the expenses page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    database_id::ExpenseID,
    expense::{core::Expense, query::search_expenses},
};

#[derive(Debug, Clone)]
pub struct SearchExpensesState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SearchExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(rename = "searchText", default)]
    pub search_text: String,
}

/// An expense as it appears in the search results.
#[derive(Debug, Serialize, PartialEq)]
pub struct SearchResult {
    pub id: ExpenseID,
    pub owner_id: i64,
    pub amount: f64,
    pub date: String,
    pub category: String,
    pub description: String,
}

impl From<Expense> for SearchResult {
    fn from(expense: Expense) -> Self {
        Self {
            id: expense.id,
            owner_id: expense.owner_id.as_i64(),
            amount: expense.amount,
            date: expense.date.to_string(),
            category: expense.category,
            description: expense.description,
        }
    }
}

/// Find the user's expenses matching `searchText`.
pub async fn search_expenses_endpoint(
    State(state): State<SearchExpensesState>,
    Extension(user_id): Extension<UserID>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Vec<SearchResult>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = search_expenses(user_id, &request.search_text, &connection)
        .inspect_err(|error| tracing::error!("could not search expenses: {error}"))?;

    Ok(Json(expenses.into_iter().map(SearchResult::from).collect()))
}
