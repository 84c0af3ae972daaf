//! Outgoing email notifications.

use std::fmt::Debug;

/// A plain text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// The errors that may occur when sending an email.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    /// The recipient address is empty.
    #[error("the email has no recipient")]
    MissingRecipient,

    /// The mail transport could not deliver the message.
    #[error("could not send email: {0}")]
    Transport(String),
}

/// Sends emails on behalf of the application.
pub trait Mailer: Debug + Send + Sync {
    /// Send `email`.
    ///
    /// # Errors
    /// Returns a [MailError] if the email could not be sent.
    fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// A [Mailer] that writes each email to the application log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &Email) -> Result<(), MailError> {
        if email.to.trim().is_empty() {
            return Err(MailError::MissingRecipient);
        }

        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            "Sending email:\n{}",
            email.body
        );

        Ok(())
    }
}
