//! Queries over many expenses: the sorted list, search, and totals.

use std::collections::BTreeMap;

use rusqlite::{Connection, params};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    expense::core::{Expense, count_expenses, from_cents, map_expense_row},
    pagination::{PageSelection, select_page},
};

/// The orders the expense list can be sorted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    AmountAsc,
    AmountDesc,
    DateAsc,
    DateDesc,
}

impl SortOrder {
    /// Parse a sort key from the query string.
    ///
    /// Returns `None` for unknown keys, which list expenses in the order they were added.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "amount_asc" => Some(SortOrder::AmountAsc),
            "amount_desc" => Some(SortOrder::AmountDesc),
            "date_asc" => Some(SortOrder::DateAsc),
            "date_desc" => Some(SortOrder::DateDesc),
            _ => None,
        }
    }

    /// The query string value for this sort order.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::AmountAsc => "amount_asc",
            SortOrder::AmountDesc => "amount_desc",
            SortOrder::DateAsc => "date_asc",
            SortOrder::DateDesc => "date_desc",
        }
    }

    fn order_by_clause(sort_order: Option<Self>) -> &'static str {
        match sort_order {
            Some(SortOrder::AmountAsc) => "ORDER BY amount_cents ASC, id ASC",
            Some(SortOrder::AmountDesc) => "ORDER BY amount_cents DESC, id ASC",
            Some(SortOrder::DateAsc) => "ORDER BY date ASC, id ASC",
            Some(SortOrder::DateDesc) => "ORDER BY date DESC, id ASC",
            None => "ORDER BY id ASC",
        }
    }
}

/// One page of a user's expenses.
#[derive(Debug, PartialEq)]
pub struct ExpensePage {
    pub expenses: Vec<Expense>,
    pub selection: PageSelection,
}

/// Get the page of `owner_id`'s expenses selected by `raw_page`.
///
/// See [select_page] for how the raw page number is interpreted.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_expense_page(
    owner_id: UserID,
    sort_order: Option<SortOrder>,
    raw_page: Option<&str>,
    page_size: u64,
    connection: &Connection,
) -> Result<ExpensePage, Error> {
    let page_size = page_size.max(1);
    let expense_count = count_expenses(owner_id, connection)?;
    let selection = select_page(raw_page, expense_count, page_size);

    let query = format!(
        "SELECT id, owner_id, amount_cents, date, category, description FROM expense
         WHERE owner_id = ?1 {} LIMIT ?2 OFFSET ?3",
        SortOrder::order_by_clause(sort_order)
    );

    let expenses = connection
        .prepare(&query)?
        .query_map(
            params![
                owner_id.as_i64(),
                page_size as i64,
                selection.offset(page_size) as i64
            ],
            map_expense_row,
        )?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExpensePage {
        expenses,
        selection,
    })
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for character in text.chars() {
        if matches!(character, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(character);
    }

    escaped
}

/// Find `owner_id`'s expenses matching `search_text`.
///
/// An expense matches when its amount (written with two decimal places) or date
/// starts with the text, or its description or category contains it. Matching ignores ASCII case and
/// treats `%` and `_` literally.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn search_expenses(
    owner_id: UserID,
    search_text: &str,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let escaped = escape_like(search_text);
    let prefix = format!("{escaped}%");
    let infix = format!("%{escaped}%");

    connection
        .prepare(
            "SELECT id, owner_id, amount_cents, date, category, description FROM expense
             WHERE owner_id = ?1 AND (
                printf('%d.%02d', amount_cents / 100, amount_cents % 100) LIKE ?2 ESCAPE '\\'
                OR date LIKE ?2 ESCAPE '\\'
                OR description LIKE ?3 ESCAPE '\\'
                OR category LIKE ?3 ESCAPE '\\'
             )
             ORDER BY id ASC",
        )?
        .query_map(params![owner_id.as_i64(), prefix, infix], map_expense_row)?
        .map(|maybe_expense| maybe_expense.map_err(Error::from))
        .collect()
}

/// The sum of `owner_id`'s expenses on `date` in cents, zero if there are none.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_total_cents_for_day(
    owner_id: UserID,
    date: Date,
    connection: &Connection,
) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM expense WHERE owner_id = ?1 AND date = ?2",
            params![owner_id.as_i64(), date],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Sum `owner_id`'s expenses per category for dates from `start` to `end`, inclusive.
///
/// The sums are taken over whole cents and converted to dollars afterwards.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_category_totals(
    owner_id: UserID,
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<BTreeMap<String, f64>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount_cents) FROM expense
             WHERE owner_id = ?1 AND date BETWEEN ?2 AND ?3
             GROUP BY category",
        )?
        .query_map(params![owner_id.as_i64(), start, end], |row| {
            Ok((row.get::<_, String>(0)?, from_cents(row.get(1)?)))
        })?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}
