//! Defines the route handler for the page that lists the user's expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;
use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    endpoints::{self, format_endpoint},
    expense::{
        core::Expense,
        query::{ExpensePage, SortOrder, get_expense_page},
    },
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement,
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_amount, link,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, create_pagination_indicators, pagination_nav},
    preferences::get_currency,
};

/// The max number of graphemes to display in the expense table rows before
/// truncating and displaying ellipses.
const MAX_DESCRIPTION_GRAPHEMES: usize = 32;

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesViewState {
    db_connection: Arc<Mutex<Connection>>,
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpensesViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query string of the expenses page.
#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    /// One of `amount_asc`, `amount_desc`, `date_asc` or `date_desc`.
    pub sort: Option<String>,
    /// Kept as text so that invalid page numbers can fall back to a valid page.
    pub page: Option<String>,
    #[serde(default)]
    pub daily_limit_exceeded: bool,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub updated: bool,
}

fn expenses_url(sort_order: Option<SortOrder>, page: u64) -> String {
    let page = page.to_string();
    let mut params = vec![("page", page.as_str())];

    if let Some(sort_order) = sort_order {
        params.insert(0, ("sort", sort_order.as_str()));
    }

    match serde_urlencoded::to_string(params) {
        Ok(query) => format!("{}?{query}", endpoints::EXPENSES_VIEW),
        Err(error) => {
            tracing::error!("Could not encode expenses page query: {error}");
            endpoints::EXPENSES_VIEW.to_owned()
        }
    }
}

fn format_description(description: &str) -> (String, Option<&str>) {
    let description_length = description.graphemes(true).count();

    if description_length <= MAX_DESCRIPTION_GRAPHEMES {
        (description.to_owned(), None)
    } else {
        let truncated: String = description
            .graphemes(true)
            .take(MAX_DESCRIPTION_GRAPHEMES - 3)
            .collect();
        (truncated + "...", Some(description))
    }
}

fn sort_links(current: Option<SortOrder>) -> Markup {
    let options = [
        (SortOrder::DateDesc, "Newest"),
        (SortOrder::DateAsc, "Oldest"),
        (SortOrder::AmountDesc, "Highest amount"),
        (SortOrder::AmountAsc, "Lowest amount"),
    ];

    html! {
        div class="flex flex-wrap gap-3 text-sm" data-sort-links
        {
            span class="font-semibold" { "Sort by:" }

            @for (sort_order, label) in options {
                @if current == Some(sort_order) {
                    span aria-current="true" class="font-semibold" { (label) }
                } @else {
                    a href=(expenses_url(Some(sort_order), 1)) class=(LINK_STYLE) { (label) }
                }
            }
        }
    }
}

fn expense_row(expense: &Expense, currency: Option<&str>) -> Markup {
    let (description, tooltip) = format_description(&expense.description);
    let confirm_message = format!(
        "Are you sure you want to delete the expense '{}'? This cannot be undone.",
        expense.description
    );

    html! {
        tr class=(TABLE_ROW_STYLE) data-expense-row="true"
        {
            td class={ (TABLE_CELL_STYLE) " text-right" } { (format_amount(expense.amount, currency)) }
            td class=(TABLE_CELL_STYLE) { time datetime=(expense.date) { (expense.date) } }
            td class=(TABLE_CELL_STYLE) title=[tooltip] { (description) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (expense.category) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a
                        href=(format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id))
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }

                    button
                        hx-delete=(format_endpoint(endpoints::EXPENSE, expense.id))
                        hx-confirm=(confirm_message)
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

/// Posts the search box text as JSON and renders the matches below it.
fn search_script() -> HeadElement {
    let script = format!(
        r#"
document.addEventListener("DOMContentLoaded", () => {{
    const input = document.getElementById("search-text");
    const results = document.getElementById("search-results");
    if (!input || !results) return;

    input.addEventListener("input", async () => {{
        const searchText = input.value.trim();
        results.replaceChildren();
        if (searchText.length === 0) return;

        const response = await fetch("{endpoint}", {{
            method: "POST",
            headers: {{ "Content-Type": "application/json" }},
            body: JSON.stringify({{ searchText }}),
        }});
        if (!response.ok) return;

        for (const expense of await response.json()) {{
            const item = document.createElement("li");
            item.textContent = `${{expense.date}}  ${{expense.amount}}  ${{expense.category}}  ${{expense.description}}`;
            results.appendChild(item);
        }}
    }});
}});
"#,
        endpoint = endpoints::SEARCH_EXPENSES
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

fn expenses_view(
    page: &ExpensePage,
    sort_order: Option<SortOrder>,
    currency: Option<&str>,
    query: &ExpensesQuery,
    max_pages: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let indicators =
        create_pagination_indicators(page.selection.page, page.selection.page_count, max_pages);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-4"
            {
                @if query.saved {
                    (Alert::Success {
                        message: "Expense saved successfully".to_owned(),
                        details: String::new(),
                    }.into_html())
                }

                @if query.updated {
                    (Alert::Success {
                        message: "Expense updated successfully".to_owned(),
                        details: String::new(),
                    }.into_html())
                }

                @if query.daily_limit_exceeded {
                    (Alert::Warning {
                        message: "Your expenses for today exceed your daily limit".to_owned(),
                        details: "An email has been sent to let you know.".to_owned(),
                    }.into_html())
                }

                div class="flex items-center justify-between"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    (link(endpoints::NEW_EXPENSE_VIEW, "Add Expense"))
                }

                input
                    id="search-text"
                    type="search"
                    placeholder="Search expenses"
                    aria-label="Search expenses"
                    class=(FORM_TEXT_INPUT_STYLE);

                ul id="search-results" class="text-sm space-y-1" {}

                (sort_links(sort_order))

                div class="relative overflow-x-auto"
                {
                    table class="w-full my-2 text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for expense in &page.expenses {
                                (expense_row(expense, currency))
                            }

                            @if page.expenses.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        data-empty-state="true"
                                        class="px-6 py-4 text-center"
                                    {
                                        "No expenses yet. "
                                        (link(endpoints::NEW_EXPENSE_VIEW, "Add one"))
                                    }
                                }
                            }
                        }
                    }
                }

                div class="flex items-center justify-between"
                {
                    p id="page-count" class="text-sm"
                    {
                        "Page " (page.selection.page) " of " (page.selection.page_count)
                    }

                    (pagination_nav(&indicators, |page| expenses_url(sort_order, page)))
                }
            }
        }
    };

    base("Expenses", &[search_script()], &content)
}

/// Render a page of the user's expenses.
pub async fn get_expenses_page(
    State(state): State<ExpensesViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    let sort_order = query.sort.as_deref().and_then(SortOrder::parse);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let page = get_expense_page(
        user_id,
        sort_order,
        query.page.as_deref(),
        state.pagination_config.page_size,
        &connection,
    )
    .inspect_err(|error| tracing::error!("could not get expenses for user {user_id}: {error}"))?;
    let currency = get_currency(user_id, &connection)?;

    Ok(expenses_view(
        &page,
        sort_order,
        currency.as_deref(),
        &query,
        state.pagination_config.max_pages,
    )
    .into_response())
}
