//! User preferences: the read-only currency and the daily expense limit.

mod currency;
mod expense_limit;
mod page;
mod set_limit_endpoint;

pub use currency::{create_user_preference_table, get_currency};
pub use expense_limit::{create_expense_limit_table, get_daily_limit_or_default, parse_daily_limit};
pub use page::get_preferences_page;
pub use set_limit_endpoint::set_daily_limit_endpoint;

#[cfg(test)]
pub(crate) use expense_limit::set_daily_limit;
