//! Expense management.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the database functions for storing and querying expenses
//! - The form shared by the add and edit pages
//! - The page and API handlers for listing, adding, editing, deleting, searching and summarising expenses

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod expenses_page;
mod form;
mod ownership;
mod query;
mod search_endpoint;
mod stats_page;
mod summary_endpoint;

pub use core::create_expense_table;
pub(crate) use core::{from_cents, to_cents};
pub use create_endpoint::create_expense_endpoint;
pub use create_page::get_new_expense_page;
pub use delete_endpoint::delete_expense_endpoint;
pub use edit_endpoint::edit_expense_endpoint;
pub use edit_page::get_edit_expense_page;
pub use expenses_page::get_expenses_page;
pub use form::{ExpenseForm, category_field};
pub use ownership::OwnershipPolicy;
pub(crate) use query::get_total_cents_for_day;
pub use search_endpoint::search_expenses_endpoint;
pub use stats_page::get_stats_page;
pub use summary_endpoint::get_category_summary_endpoint;

#[cfg(test)]
pub(crate) use core::{ExpenseData, create_expense, get_expense};
