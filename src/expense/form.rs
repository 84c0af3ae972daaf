//! The form shared by the add and edit expense pages, and its validation.

use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    category::Category,
    database_id::ExpenseID,
    endpoints::{self, format_endpoint},
    expense::core::{Expense, ExpenseData, to_cents},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        loading_spinner,
    },
};

/// The raw form fields for adding or editing an expense.
///
/// Every field is kept as text so that invalid input can be shown back to the user.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expense_date: String,
    #[serde(default)]
    pub category: String,
    /// The category the classifier suggested before the user had a chance to change it.
    #[serde(default)]
    pub initial_predicted_category: String,
}

/// The reasons an expense form may be rejected, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExpenseFormError {
    #[error("Amount is required")]
    AmountRequired,
    #[error("Description is required")]
    DescriptionRequired,
    #[error("Amount must be a number greater than zero")]
    InvalidAmount,
    #[error("Invalid date format")]
    InvalidDate,
    #[error("Date cannot be in the future")]
    FutureDate,
}

impl ExpenseForm {
    /// Fill the form with the fields of an existing expense.
    pub fn from_expense(expense: &Expense) -> Self {
        Self {
            amount: expense.amount.to_string(),
            description: expense.description.clone(),
            expense_date: expense.date.to_string(),
            category: expense.category.clone(),
            initial_predicted_category: String::new(),
        }
    }

    /// A blank form dated `today`.
    pub fn dated(today: Date) -> Self {
        Self {
            expense_date: today.to_string(),
            ..Default::default()
        }
    }

    /// Check that the amount and description were filled in.
    ///
    /// # Errors
    /// Returns the first missing field as an [ExpenseFormError].
    pub fn check_required(&self) -> Result<(), ExpenseFormError> {
        if self.amount.trim().is_empty() {
            return Err(ExpenseFormError::AmountRequired);
        }

        if self.description.trim().is_empty() {
            return Err(ExpenseFormError::DescriptionRequired);
        }

        Ok(())
    }

    /// Validate every field, treating dates after `today` as invalid.
    ///
    /// The category is trimmed but may be empty. Amounts that round to zero cents are invalid.
    ///
    /// # Errors
    /// Returns the first [ExpenseFormError] found.
    pub fn validate(&self, today: Date) -> Result<ExpenseData, ExpenseFormError> {
        self.check_required()?;

        let amount = self
            .amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|amount| amount.is_finite() && to_cents(*amount) > 0)
            .ok_or(ExpenseFormError::InvalidAmount)?;

        let date = Date::parse(
            self.expense_date.trim(),
            format_description!("[year]-[month]-[day]"),
        )
        .map_err(|_| ExpenseFormError::InvalidDate)?;

        if date > today {
            return Err(ExpenseFormError::FutureDate);
        }

        Ok(ExpenseData {
            amount,
            date,
            category: self.category.trim().to_owned(),
            description: self.description.trim().to_owned(),
        })
    }

    /// Whether the user replaced a category suggested by the classifier with their own.
    pub fn corrects_prediction(&self) -> bool {
        let predicted = self.initial_predicted_category.trim();
        let category = self.category.trim();

        !predicted.is_empty() && !category.is_empty() && predicted != category
    }
}

/// Where the expense form is submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseFormAction {
    Create,
    Edit(ExpenseID),
}

/// The category input with its suggestions and the hidden classifier prediction.
///
/// This is also the fragment the predict category endpoint swaps in.
pub fn category_field(form: &ExpenseForm, categories: &[Category]) -> Markup {
    html! {
        div id="category-field"
        {
            label for="category" class=(FORM_LABEL_STYLE) { "Category" }

            input
                name="category"
                id="category"
                type="text"
                list="category-options"
                placeholder="Leave blank to predict from the description"
                value=(form.category)
                class=(FORM_TEXT_INPUT_STYLE);

            datalist id="category-options"
            {
                @for category in categories {
                    option value=(category.name) {}
                }
            }

            input
                type="hidden"
                name="initial_predicted_category"
                value=(form.initial_predicted_category);
        }
    }
}

/// Render the add or edit expense form.
///
/// `error_message` is shown above the fields, and the submitted values are kept.
pub fn expense_form(
    action: ExpenseFormAction,
    form: &ExpenseForm,
    categories: &[Category],
    max_date: Date,
    error_message: Option<&str>,
) -> Markup {
    let (hx_post, hx_put, button_text) = match action {
        ExpenseFormAction::Create => (
            Some(endpoints::POST_EXPENSE.to_owned()),
            None,
            "Add Expense",
        ),
        ExpenseFormAction::Edit(id) => (
            None,
            Some(format_endpoint(endpoints::EXPENSE, id)),
            "Save Changes",
        ),
    };

    html! {
        form
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    name="amount"
                    id="amount"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    autofocus[error_message.is_none()]
                    value=(form.amount)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    name="description"
                    id="description"
                    type="text"
                    placeholder="Description"
                    required
                    value=(form.description)
                    hx-post=(endpoints::PREDICT_CATEGORY)
                    hx-trigger="change"
                    hx-target="#category-field"
                    hx-swap="outerHTML"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="expense_date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="expense_date"
                    id="expense_date"
                    type="date"
                    max=(max_date)
                    required
                    value=(form.expense_date)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (category_field(form, categories))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator"
                {
                    (loading_spinner())
                }
                " " (button_text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;
    use time::macros::date;

    use crate::{
        category::{Category, CategoryName},
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_form_submit_button,
            assert_hx_endpoint, must_get_form,
        },
    };

    use super::{ExpenseForm, ExpenseFormAction, ExpenseFormError, expense_form};

    const TODAY: time::Date = date!(2025 - 06 - 15);

    fn form(amount: &str, description: &str, expense_date: &str) -> ExpenseForm {
        ExpenseForm {
            amount: amount.to_owned(),
            description: description.to_owned(),
            expense_date: expense_date.to_owned(),
            category: " Food ".to_owned(),
            initial_predicted_category: String::new(),
        }
    }

    #[test]
    fn valid_form_is_trimmed_and_parsed() {
        let data = form("12.5", " Lunch ", "2025-06-15").validate(TODAY).unwrap();

        assert_eq!(data.amount, 12.5);
        assert_eq!(data.description, "Lunch");
        assert_eq!(data.date, TODAY);
        assert_eq!(data.category, "Food");
    }

    #[test]
    fn errors_are_reported_in_order() {
        let cases = [
            (form("", "", "nope"), ExpenseFormError::AmountRequired),
            (form("1", " ", "nope"), ExpenseFormError::DescriptionRequired),
            (form("abc", "Lunch", "nope"), ExpenseFormError::InvalidAmount),
            (form("0", "Lunch", "2025-06-01"), ExpenseFormError::InvalidAmount),
            (form("-3", "Lunch", "2025-06-01"), ExpenseFormError::InvalidAmount),
            (form("0.004", "Lunch", "2025-06-01"), ExpenseFormError::InvalidAmount),
            (form("inf", "Lunch", "2025-06-01"), ExpenseFormError::InvalidAmount),
            (form("3", "Lunch", "15/06/2025"), ExpenseFormError::InvalidDate),
            (form("3", "Lunch", ""), ExpenseFormError::InvalidDate),
            (form("3", "Lunch", "2025-06-16"), ExpenseFormError::FutureDate),
        ];

        for (form, want) in cases {
            assert_eq!(form.validate(TODAY), Err(want), "form: {form:?}");
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(ExpenseFormError::AmountRequired.to_string(), "Amount is required");
        assert_eq!(
            ExpenseFormError::DescriptionRequired.to_string(),
            "Description is required"
        );
        assert_eq!(ExpenseFormError::InvalidDate.to_string(), "Invalid date format");
        assert_eq!(
            ExpenseFormError::FutureDate.to_string(),
            "Date cannot be in the future"
        );
    }

    #[test]
    fn corrects_prediction_only_when_both_categories_are_set_and_differ() {
        let mut form = form("3", "Bus", "2025-06-01");

        form.category = "Travel".to_owned();
        form.initial_predicted_category = "Transport".to_owned();
        assert!(form.corrects_prediction());

        form.initial_predicted_category = "Travel".to_owned();
        assert!(!form.corrects_prediction());

        form.initial_predicted_category = String::new();
        assert!(!form.corrects_prediction());

        form.initial_predicted_category = "Transport".to_owned();
        form.category = "  ".to_owned();
        assert!(!form.corrects_prediction());
    }

    #[test]
    fn create_form_keeps_input_and_shows_error() {
        let categories = [Category {
            id: 1,
            name: CategoryName::new("Food").unwrap(),
        }];
        let submitted = form("abc", "Lunch", "2025-06-01");

        let html = expense_form(
            ExpenseFormAction::Create,
            &submitted,
            &categories,
            TODAY,
            Some("Amount must be a number greater than zero"),
        )
        .into_string();

        let html = Html::parse_fragment(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_EXPENSE, "hx-post");
        assert_form_error_message(&form, "Amount must be a number greater than zero");
        assert_form_input_with_value(&form, "amount", "number", "abc");
        assert_form_input_with_value(&form, "description", "text", "Lunch");
        assert_form_input_with_value(&form, "expense_date", "date", "2025-06-01");
        assert_form_submit_button(&form);
        assert!(html.html().contains(r#"<option value="Food">"#));
    }

    #[test]
    fn edit_form_puts_to_expense_endpoint() {
        let html = expense_form(
            ExpenseFormAction::Edit(7),
            &ExpenseForm::default(),
            &[],
            TODAY,
            None,
        )
        .into_string();

        let html = Html::parse_fragment(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/api/expenses/7", "hx-put");
        assert!(form.value().attr("hx-post").is_none());
    }
}
