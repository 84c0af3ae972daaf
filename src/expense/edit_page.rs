//! Defines the route handler for the page for editing an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    category::{Category, get_all_categories},
    database_id::ExpenseID,
    endpoints,
    expense::{
        core::{Expense, get_expense},
        form::{ExpenseForm, ExpenseFormAction, expense_form},
        ownership::OwnershipPolicy,
    },
    html::{FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_today,
};

/// The state needed for the edit expense page.
#[derive(Debug, Clone)]
pub struct EditExpensePageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
    pub ownership_policy: OwnershipPolicy,
}

impl FromRef<AppState> for EditExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
            ownership_policy: state.ownership_policy,
        }
    }
}

fn edit_expense_view(expense: &Expense, max_date: Date, categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_EXPENSE_VIEW).into_html();
    let form = ExpenseForm::from_expense(expense);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Edit Expense" }

            (expense_form(ExpenseFormAction::Edit(expense.id), &form, categories, max_date, None))
        }
    };

    base("Edit Expense", &[], &content)
}

/// Renders the page for editing an expense.
///
/// Responds with the 404 page if the expense does not exist or, when
/// ownership is enforced, belongs to someone else.
pub async fn get_edit_expense_page(
    State(state): State<EditExpensePageState>,
    Extension(user_id): Extension<UserID>,
    Path(expense_id): Path<ExpenseID>,
) -> Result<Response, Error> {
    let max_date = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(
        expense_id,
        state.ownership_policy.scope(user_id),
        &connection,
    )
    .inspect_err(|error| tracing::debug!("Could not get expense {expense_id}: {error}"))?;
    let categories = get_all_categories(&connection)?;

    Ok(edit_expense_view(&expense, max_date, &categories).into_response())
}
