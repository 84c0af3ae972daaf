//! Alert system for displaying success, warning and error messages to users.
//!
//! Alerts are rendered as HTML fragments that HTMX swaps into the
//! `#alert-container` element defined in the base page.

use maud::{Markup, html};

/// An alert message with a short headline and longer details.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    Success { message: String, details: String },
    Warning { message: String, details: String },
    Error { message: String, details: String },
}

const ALERT_BASE_STYLE: &str = "flex items-start justify-between p-4 mb-4 text-sm rounded-lg border";
const SUCCESS_STYLE: &str = "text-green-800 bg-green-50 border-green-300 \
    dark:bg-gray-800 dark:text-green-400 dark:border-green-800";
const WARNING_STYLE: &str = "text-yellow-800 bg-yellow-50 border-yellow-300 \
    dark:bg-gray-800 dark:text-yellow-300 dark:border-yellow-800";
const ERROR_STYLE: &str = "text-red-800 bg-red-50 border-red-300 \
    dark:bg-gray-800 dark:text-red-400 dark:border-red-800";

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (style, role, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, "status", message, details),
            Alert::Warning { message, details } => (WARNING_STYLE, "alert", message, details),
            Alert::Error { message, details } => (ERROR_STYLE, "alert", message, details),
        };

        html! {
            div
                class={ (ALERT_BASE_STYLE) " " (style) }
                role=(role)
                data-alert
            {
                div
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty()
                    {
                        p class="mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="ms-4 font-bold"
                    onclick="this.closest('[data-alert]').remove()"
                {
                    "×"
                }
            }
        }
    }
}
