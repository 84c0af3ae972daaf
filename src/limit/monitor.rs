//! Checks a user's spending for the day against their daily limit.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    auth::{User, UserID},
    expense::{from_cents, get_total_cents_for_day, to_cents},
    limit::mailer::{Email, Mailer},
    preferences::get_daily_limit_or_default,
};

/// How a user's spending for a day compares to their daily limit, in whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitStatus {
    /// Everything spent on the day, including the expense being added.
    pub total_cents: i64,
    /// The user's limit, or the default if they have not set one.
    pub limit_cents: i64,
}

impl LimitStatus {
    /// Whether the total is strictly greater than the limit.
    pub fn is_exceeded(&self) -> bool {
        self.total_cents > self.limit_cents
    }

    /// The total in dollars.
    pub fn total(&self) -> f64 {
        from_cents(self.total_cents)
    }

    /// The limit in dollars.
    pub fn limit(&self) -> f64 {
        from_cents(self.limit_cents)
    }
}

/// Compare `owner_id`'s spending on `today` plus `new_amount` against their daily limit.
///
/// Call this before saving the new expense so that it is counted exactly once.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn check_daily_limit(
    owner_id: UserID,
    new_amount: f64,
    today: Date,
    default_limit: f64,
    connection: &Connection,
) -> Result<LimitStatus, Error> {
    let spent_cents = get_total_cents_for_day(owner_id, today, connection)?;
    let limit = get_daily_limit_or_default(owner_id, default_limit, connection)?;

    Ok(LimitStatus {
        total_cents: spent_cents + to_cents(new_amount),
        limit_cents: to_cents(limit),
    })
}

/// The email telling `user` they have gone over their daily limit.
pub fn limit_exceeded_email(user: &User, from: &str) -> Email {
    Email {
        from: from.to_owned(),
        to: user.email.clone(),
        subject: "Daily Expense Limit Exceeded".to_owned(),
        body: format!(
            "Hello {},\n\nYour expenses today exceed your daily limit.",
            user.username
        ),
    }
}

/// Email `user` that they have exceeded their daily limit.
///
/// Failures are logged and otherwise ignored.
pub fn notify_limit_exceeded(mailer: &dyn Mailer, user: &User, from: &str) {
    match mailer.send(&limit_exceeded_email(user, from)) {
        Ok(()) => tracing::info!("Sent daily limit email to user {}", user.id),
        Err(error) => tracing::error!(
            "Could not send daily limit email to user {}: {error}",
            user.id
        ),
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        expense::{ExpenseData, create_expense},
        limit::mailer::test_support::RecordingMailer,
        preferences::set_daily_limit,
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{check_daily_limit, limit_exceeded_email, notify_limit_exceeded};

    const TODAY: time::Date = date!(2025 - 03 - 10);

    fn spend(amount: f64, date: time::Date) -> ExpenseData {
        ExpenseData {
            amount,
            date,
            category: "Food".to_owned(),
            description: "Lunch".to_owned(),
        }
    }

    #[test]
    fn default_limit_is_exceeded_by_new_amount() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);

        let status = check_daily_limit(user.id, 5001.0, TODAY, 5000.0, &connection).unwrap();

        assert_eq!(status.total_cents, 500_100);
        assert_eq!(status.limit_cents, 500_000);
        assert!(status.is_exceeded());
    }

    #[test]
    fn configured_limit_counts_only_todays_expenses() {
        let connection = get_test_connection();
        let user = create_test_user("bob", &connection);
        set_daily_limit(user.id, 100.0, &connection).unwrap();
        create_expense(user.id, spend(90.0, TODAY), &connection).unwrap();
        create_expense(user.id, spend(500.0, date!(2025 - 03 - 09)), &connection).unwrap();

        let status = check_daily_limit(user.id, 5.0, TODAY, 5000.0, &connection).unwrap();

        assert_eq!(status.total(), 95.0);
        assert!(!status.is_exceeded());
    }

    #[test]
    fn reaching_the_limit_exactly_is_not_exceeding_it() {
        let connection = get_test_connection();
        let user = create_test_user("carol", &connection);
        set_daily_limit(user.id, 100.0, &connection).unwrap();
        create_expense(user.id, spend(60.0, TODAY), &connection).unwrap();

        let status = check_daily_limit(user.id, 40.0, TODAY, 5000.0, &connection).unwrap();

        assert!(!status.is_exceeded());
    }

    #[test]
    fn cent_amounts_that_sum_to_the_limit_do_not_exceed_it() {
        let connection = get_test_connection();
        let user = create_test_user("dave", &connection);
        set_daily_limit(user.id, 0.3, &connection).unwrap();
        create_expense(user.id, spend(0.1, TODAY), &connection).unwrap();

        let status = check_daily_limit(user.id, 0.2, TODAY, 5000.0, &connection).unwrap();

        assert_eq!(status.total_cents, 30);
        assert_eq!(status.limit_cents, 30);
        assert!(!status.is_exceeded());
    }

    #[test]
    fn one_cent_over_the_limit_exceeds_it() {
        let connection = get_test_connection();
        let user = create_test_user("erin", &connection);
        set_daily_limit(user.id, 0.3, &connection).unwrap();
        create_expense(user.id, spend(0.1, TODAY), &connection).unwrap();

        let status = check_daily_limit(user.id, 0.21, TODAY, 5000.0, &connection).unwrap();

        assert!(status.is_exceeded());
    }

    #[test]
    fn email_greets_user_by_name() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);

        let email = limit_exceeded_email(&user, "noreply@example.com");

        assert_eq!(email.to, "alice@example.com");
        assert_eq!(email.subject, "Daily Expense Limit Exceeded");
        assert_eq!(
            email.body,
            "Hello alice,\n\nYour expenses today exceed your daily limit."
        );
    }

    #[test]
    fn mail_failure_is_swallowed() {
        let connection = get_test_connection();
        let user = create_test_user("alice", &connection);
        let mailer = RecordingMailer::failing();

        notify_limit_exceeded(&mailer, &user, "noreply@example.com");

        assert!(mailer.sent().is_empty());
    }
}
