//! The endpoint for changing the daily expense limit.

use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    Error,
    auth::UserID,
    endpoints,
    preferences::{
        expense_limit::{parse_daily_limit, set_daily_limit},
        page::{PreferencesState, daily_limit_form},
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct DailyLimitForm {
    #[serde(default)]
    pub daily_expense_limit: String,
}

const INVALID_LIMIT_MESSAGE: &str = "Daily limit must be a number that is zero or more";

/// Set the user's daily limit and redirect to the preferences page.
///
/// Values that are not a number, or are negative, re-render the form with an error.
pub async fn set_daily_limit_endpoint(
    State(state): State<PreferencesState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<DailyLimitForm>,
) -> Response {
    let limit = match parse_daily_limit(&form.daily_expense_limit) {
        Some(limit) => limit,
        None => {
            return daily_limit_form(&form.daily_expense_limit, Some(INVALID_LIMIT_MESSAGE))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = set_daily_limit(user_id, limit, &connection) {
        tracing::error!("could not set daily limit for user {user_id}: {error}");
        return error.into_alert_response();
    }

    (
        HxRedirect(format!("{}?limit_updated=true", endpoints::PREFERENCES_VIEW)),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
