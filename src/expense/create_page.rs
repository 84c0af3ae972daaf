//! Defines the route handler for the page for adding a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    endpoints,
    expense::form::{ExpenseForm, ExpenseFormAction, expense_form},
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the add expense page.
#[derive(Debug, Clone)]
pub struct NewExpensePageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for the category suggestions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn new_expense_view(today: Date, categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();
    let form = ExpenseForm::dated(today);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Add Expense" }

            (expense_form(ExpenseFormAction::Create, &form, categories, today, None))
        }
    };

    base("Add Expense", &[], &content)
}

/// Renders the page for adding an expense, with the date set to today.
pub async fn get_new_expense_page(
    State(state): State<NewExpensePageState>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let categories = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_categories(&connection)
            .inspect_err(|error| tracing::error!("Could not get categories: {error}"))?
    };

    Ok(new_expense_view(today, &categories).into_response())
}
