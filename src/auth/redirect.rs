//! Helpers for the `redirect_url` that sends users back to where they were after logging in.

use axum::{extract::Request, http::Uri};

use crate::endpoints;

/// A redirect target must be a local path, not protocol-relative, and not the log-in page itself.
fn is_safe_redirect_target(path_and_query: &str) -> bool {
    if !path_and_query.starts_with('/') || path_and_query.starts_with("//") {
        return false;
    }

    let path = path_and_query
        .split_once('?')
        .map_or(path_and_query, |(path, _)| path);

    path != endpoints::LOG_IN_VIEW
}

/// Reduce `raw_url` to a safe local path and query, or `None` if it points elsewhere.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_target(path_and_query).then(|| path_and_query.to_owned())
}

/// The log-in URL to send an unauthenticated `request` to.
///
/// Page requests come back to the requested URL. HTMX requests to `/api`
/// routes come back to the page that issued them (the `HX-Current-URL`
/// header). Anything else falls back to the expenses page.
pub fn build_log_in_redirect_url(request: &Request) -> String {
    let redirect_target = if request.uri().path().starts_with("/api") {
        redirect_target_from_hx_request(request)
    } else {
        request
            .uri()
            .path_and_query()
            .and_then(|path_and_query| normalize_redirect_url(path_and_query.as_str()))
    };

    let redirect_target = redirect_target.unwrap_or_else(|| {
        tracing::warn!(
            "No usable redirect target for {}, falling back to the expenses page.",
            request.uri()
        );
        endpoints::EXPENSES_VIEW.to_owned()
    });

    match serde_urlencoded::to_string([("redirect_url", &redirect_target)]) {
        Ok(query) => format!("{}?{}", endpoints::LOG_IN_VIEW, query),
        Err(error) => {
            tracing::error!("Could not encode redirect URL {redirect_target}: {error}");
            endpoints::LOG_IN_VIEW.to_owned()
        }
    }
}

fn redirect_target_from_hx_request(request: &Request) -> Option<String> {
    let headers = request.headers();
    let is_hx_request = headers
        .get("hx-request")
        .and_then(|header| header.to_str().ok())
        .is_some_and(|header| header.eq_ignore_ascii_case("true"));

    if !is_hx_request {
        return None;
    }

    let current_url = headers
        .get("hx-current-url")
        .and_then(|header| header.to_str().ok())?;

    // HX-Current-URL is absolute, so only the path and query are kept.
    let uri = current_url.parse::<Uri>().ok()?;
    let path_and_query = uri.path_and_query()?.as_str();

    is_safe_redirect_target(path_and_query).then(|| path_and_query.to_owned())
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, extract::Request};

    use crate::endpoints;

    use super::{build_log_in_redirect_url, normalize_redirect_url};

    #[test]
    fn keeps_local_path_and_query() {
        assert_eq!(
            normalize_redirect_url("/expenses?sort=amount_desc&page=2"),
            Some("/expenses?sort=amount_desc&page=2".to_owned())
        );
    }

    #[test]
    fn rejects_external_and_protocol_relative_urls() {
        assert_eq!(normalize_redirect_url("https://evil.example.com/"), None);
        assert_eq!(normalize_redirect_url("//evil.example.com/"), None);
    }

    #[test]
    fn rejects_log_in_page() {
        assert_eq!(normalize_redirect_url("/log_in?redirect_url=%2F"), None);
    }

    #[test]
    fn page_request_redirects_back_to_page() {
        let request = Request::builder()
            .uri("/stats")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            "/log_in?redirect_url=%2Fstats"
        );
    }

    #[test]
    fn api_request_uses_hx_current_url() {
        let request = Request::builder()
            .uri("/api/expenses")
            .header("HX-Request", "true")
            .header("HX-Current-URL", "http://localhost:3000/expenses/new")
            .body(Body::empty())
            .unwrap();

        assert_eq!(
            build_log_in_redirect_url(&request),
            "/log_in?redirect_url=%2Fexpenses%2Fnew"
        );
    }

    #[test]
    fn api_request_without_htmx_headers_falls_back_to_expenses() {
        let request = Request::builder()
            .uri("/api/expenses/search")
            .body(Body::empty())
            .unwrap();

        let want = format!(
            "{}?{}",
            endpoints::LOG_IN_VIEW,
            serde_urlencoded::to_string([("redirect_url", endpoints::EXPENSES_VIEW)]).unwrap()
        );
        assert_eq!(build_log_in_redirect_url(&request), want);
    }
}
