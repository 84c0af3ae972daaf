//! Defines the endpoint for adding a new expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    category::get_all_categories,
    classifier::{CategoryClassifier, DatasetUpdateClient, LabeledDescription},
    endpoints,
    expense::{
        core::create_expense,
        form::{ExpenseForm, ExpenseFormAction, ExpenseFormError, expense_form},
    },
    limit::{Mailer, check_daily_limit, notify_limit_exceeded},
    timezone::local_today,
};

/// The state needed to add an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// Fills in the category when the user leaves it blank.
    pub classifier: CategoryClassifier,
    /// Where corrected predictions are sent, if anywhere.
    pub dataset_update_client: Option<DatasetUpdateClient>,
    /// Sends the daily limit notification.
    pub mailer: Arc<dyn Mailer>,
    /// The limit used for users who have not set their own.
    pub default_daily_limit: f64,
    /// The sender address of notification emails.
    pub email_from: String,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            classifier: state.classifier.clone(),
            dataset_update_client: state.dataset_update_client.clone(),
            mailer: state.mailer.clone(),
            default_daily_limit: state.default_daily_limit,
            email_from: state.email_from.clone(),
        }
    }
}

/// Re-render the add expense form with the submitted values and `error`.
pub(super) fn render_form_error(
    db_connection: &Mutex<Connection>,
    action: ExpenseFormAction,
    form: &ExpenseForm,
    today: Date,
    error: ExpenseFormError,
) -> Result<Response, Error> {
    let categories = {
        let connection = db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_all_categories(&connection)?
    };

    Ok(expense_form(action, form, &categories, today, Some(&error.to_string())).into_response())
}

fn send_correction(client: Option<&DatasetUpdateClient>, form: &ExpenseForm) {
    let Some(client) = client else {
        tracing::debug!("No dataset update URL configured, dropping category correction");
        return;
    };

    client.submit_in_background(LabeledDescription {
        description: form.description.trim().to_owned(),
        category: form.category.trim().to_owned(),
    });
}

/// A route handler for adding an expense, redirects to the expenses view on success.
///
/// A blank category is filled in by the classifier. When the total spent
/// today, including this expense, goes over the user's daily limit the user
/// is emailed and the expenses view shows a warning. The expense is saved either way.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ExpenseForm>,
) -> Response {
    match create_expense_inner(state, user_id, form).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!("could not create expense for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

async fn create_expense_inner(
    state: CreateExpenseState,
    user_id: UserID,
    form: ExpenseForm,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    if let Err(error) = form.check_required() {
        return render_form_error(
            &state.db_connection,
            ExpenseFormAction::Create,
            &form,
            today,
            error,
        );
    }

    if form.corrects_prediction() {
        send_correction(state.dataset_update_client.as_ref(), &form);
    }

    let mut data = match form.validate(today) {
        Ok(data) => data,
        Err(error) => {
            return render_form_error(
                &state.db_connection,
                ExpenseFormAction::Create,
                &form,
                today,
                error,
            );
        }
    };

    if data.category.is_empty() {
        data.category = state.classifier.predict(data.description.clone()).await?;
    }

    let (limit_status, user) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let limit_status = check_daily_limit(
            user_id,
            data.amount,
            today,
            state.default_daily_limit,
            &connection,
        )?;
        let expense = create_expense(user_id, data, &connection)?;
        tracing::debug!("Created expense {} for user {user_id}", expense.id);

        let user = if limit_status.is_exceeded() {
            Some(get_user_by_id(user_id, &connection)?)
        } else {
            None
        };

        (limit_status, user)
    };

    let mut redirect_url = format!("{}?saved=true", endpoints::EXPENSES_VIEW);

    if let Some(user) = user {
        tracing::info!(
            "User {user_id} spent {} today, over their limit of {}",
            limit_status.total(),
            limit_status.limit()
        );
        notify_limit_exceeded(state.mailer.as_ref(), &user, &state.email_from);
        redirect_url.push_str("&daily_limit_exceeded=true");
    }

    Ok((HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response())
}
