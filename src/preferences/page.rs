//! The preferences page: the user's currency and daily expense limit.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
    preferences::{currency::get_currency, expense_limit::get_daily_limit_or_default},
};

/// The state needed for the preferences page and for setting the daily limit.
#[derive(Debug, Clone)]
pub struct PreferencesState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The limit used for users who have not set their own.
    pub default_daily_limit: f64,
}

impl FromRef<AppState> for PreferencesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            default_daily_limit: state.default_daily_limit,
        }
    }
}

/// Render the form for setting the daily limit, keeping `value` in the input.
pub(super) fn daily_limit_form(value: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::DAILY_LIMIT)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            div
            {
                label for="daily_expense_limit" class=(FORM_LABEL_STYLE) { "Daily Expense Limit" }

                input
                    name="daily_expense_limit"
                    id="daily_expense_limit"
                    type="number"
                    step="0.01"
                    min="0"
                    required
                    value=(value)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator"
                {
                    (loading_spinner())
                }
                " Save"
            }
        }
    }
}

fn preferences_view(currency: Option<&str>, daily_limit: f64, limit_updated: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::PREFERENCES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Preferences" }

            @if limit_updated {
                (Alert::Success {
                    message: "Daily Expense Limit Updated Successfully!".to_owned(),
                    details: String::new(),
                }.into_html())
            }

            dl class="w-full mb-6"
            {
                dt class=(FORM_LABEL_STYLE) { "Currency" }
                dd id="currency" { (currency.unwrap_or("Not set")) }
            }

            (daily_limit_form(&daily_limit.to_string(), None))
        }
    };

    base("Preferences", &[], &content)
}

#[derive(Debug, Default, Deserialize)]
pub struct PreferencesQuery {
    #[serde(default)]
    pub limit_updated: bool,
}

/// Display the user's currency and daily limit.
pub async fn get_preferences_page(
    State(state): State<PreferencesState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PreferencesQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let currency = get_currency(user_id, &connection)?;
    let daily_limit =
        get_daily_limit_or_default(user_id, state.default_daily_limit, &connection)?;

    Ok(preferences_view(currency.as_deref(), daily_limit, query.limit_updated).into_response())
}
