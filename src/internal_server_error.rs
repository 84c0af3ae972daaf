//! The 500 page, shown when a request fails for reasons the user cannot fix.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// A 500 page with a short `description` of what failed and a `fix` for the operator.
pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        let page = error_view("Internal Server Error", "500", self.description, self.fix);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }
}

/// Handler for the error page that HTMX requests are redirected to.
pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::{InternalServerError, get_internal_server_error_page};

    #[tokio::test]
    async fn error_page_is_500() {
        let response = get_internal_server_error_page().await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_valid_html(&parse_html_document(response).await);
    }

    #[tokio::test]
    async fn shows_description_and_fix() {
        let response = InternalServerError {
            description: "Category Prediction Failed",
            fix: "Check the dataset file",
        }
        .into_response();

        let text = parse_html_document(response).await.html();
        assert!(text.contains("Category Prediction Failed"));
        assert!(text.contains("Check the dataset file"));
    }
}
