//! The advisory daily spending limit and the email sent when it is exceeded.

mod mailer;
mod monitor;

pub use mailer::{Email, LogMailer, MailError, Mailer};
pub(crate) use monitor::{check_daily_limit, notify_limit_exceeded};

#[cfg(test)]
pub(crate) use mailer::test_support::RecordingMailer;
