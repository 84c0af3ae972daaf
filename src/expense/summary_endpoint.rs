//! Per-category spending over the last six months, as JSON.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Serialize;
use time::{Date, Duration};

use crate::{
    AppState, Error, auth::UserID, expense::query::get_category_totals, timezone::local_today,
};

/// How far back the category summary looks, counting back from today.
pub(super) const SUMMARY_WINDOW: Duration = Duration::days(30 * 6);

/// The state needed for the category summary and the stats page.
#[derive(Debug, Clone)]
pub struct CategorySummaryState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CategorySummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub expense_category_data: BTreeMap<String, f64>,
}

/// Sum `user_id`'s spending per category from [SUMMARY_WINDOW] before `today` up to `today`.
pub(super) fn summarise_categories(
    state: &CategorySummaryState,
    user_id: UserID,
) -> Result<(Date, BTreeMap<String, f64>), Error> {
    let today = local_today(&state.local_timezone)?;
    let start = today - SUMMARY_WINDOW;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let totals = get_category_totals(user_id, start, today, &connection)
        .inspect_err(|error| tracing::error!("could not get category totals: {error}"))?;

    Ok((start, totals))
}

/// Respond with `{"expense_category_data": {category: total}}`.
pub async fn get_category_summary_endpoint(
    State(state): State<CategorySummaryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<CategorySummary>, Error> {
    let (_, expense_category_data) = summarise_categories(&state, user_id)?;

    Ok(Json(CategorySummary {
        expense_category_data,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, response::IntoResponse};
    use serde_json::json;
    use time::{Duration, OffsetDateTime};

    use crate::{
        expense::{ExpenseData, create_expense},
        test_utils::{assert_status_ok, create_test_user, get_test_connection, parse_json_body},
    };

    use super::{CategorySummaryState, SUMMARY_WINDOW, get_category_summary_endpoint};

    #[tokio::test]
    async fn sums_categories_inside_window() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);
        let other = create_test_user("bob", &connection);
        let today = OffsetDateTime::now_utc().date();
        let expenses = [
            (user.id, 10.0, today, "Food"),
            (user.id, 5.5, today - SUMMARY_WINDOW, "Food"),
            (user.id, 20.0, today - Duration::days(3), "Transport"),
            (user.id, 99.0, today - SUMMARY_WINDOW - Duration::days(1), "Food"),
            (other.id, 7.0, today, "Food"),
        ];
        for (owner, amount, date, category) in expenses {
            create_expense(
                owner,
                ExpenseData {
                    amount,
                    date,
                    category: category.to_owned(),
                    description: "test".to_owned(),
                },
                &connection,
            )
            .unwrap();
        }
        let state = CategorySummaryState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_category_summary_endpoint(State(state), Extension(user.id))
            .await
            .into_response();

        assert_status_ok(&response);
        assert_eq!(
            parse_json_body(response).await,
            json!({"expense_category_data": {"Food": 15.5, "Transport": 20.0}})
        );
    }

    #[tokio::test]
    async fn no_expenses_gives_empty_object() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);
        let state = CategorySummaryState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_category_summary_endpoint(State(state), Extension(user.id))
            .await
            .into_response();

        assert_eq!(
            parse_json_body(response).await,
            json!({"expense_category_data": {}})
        );
    }

    #[tokio::test]
    async fn cent_amounts_sum_without_rounding_error() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);
        let today = OffsetDateTime::now_utc().date();
        for amount in [0.1, 0.2] {
            create_expense(
                user.id,
                ExpenseData {
                    amount,
                    date: today,
                    category: "Food".to_owned(),
                    description: "Snack".to_owned(),
                },
                &connection,
            )
            .unwrap();
        }
        let state = CategorySummaryState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        };

        let response = get_category_summary_endpoint(State(state), Extension(user.id))
            .await
            .into_response();

        assert_eq!(
            parse_json_body(response).await,
            json!({"expense_category_data": {"Food": 0.3}})
        );
    }
}
