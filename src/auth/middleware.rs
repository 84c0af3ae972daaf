//! The auth guards placed in front of protected routes.
//!
//! A request with a valid auth cookie has its [UserID] added to the request extensions and its
//! session extended. Any other request is sent to the log-in page, keeping the page the user
//! was trying to reach in the `redirect_url` query parameter.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, UtcOffset};

use crate::{
    AppState,
    auth::{
        UserID, build_log_in_redirect_url,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
    },
    timezone::get_local_offset,
};

/// How far into the future each authenticated request pushes the session expiry.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How an unauthenticated client is sent to the log-in page.
#[derive(Debug, Clone, Copy)]
enum LogInRedirect {
    /// A 303 with a `Location` header, for full page loads.
    Page,
    /// A 200 with an `HX-Redirect` header, for requests made by HTMX or `fetch`.
    Htmx,
}

impl LogInRedirect {
    fn to(self, url: &str) -> Response {
        match self {
            LogInRedirect::Page => Redirect::to(url).into_response(),
            LogInRedirect::Htmx => (HxRedirect(url.to_owned()), StatusCode::OK).into_response(),
        }
    }
}

/// Find the user ID in the auth cookie, or explain why there is none.
async fn authenticate(
    state: &AuthState,
    parts: &mut Parts,
) -> Result<(UserID, PrivateCookieJar, UtcOffset), String> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| format!("invalid timezone {}", state.local_timezone))?;

    let jar = PrivateCookieJar::from_request_parts(parts, state)
        .await
        .map_err(|error| format!("could not read the cookie jar: {error:?}"))?;

    let token = get_token_from_cookies(&jar).map_err(|error| error.to_string())?;

    Ok((token.user_id, jar, local_offset))
}

async fn guard(state: AuthState, request: Request, next: Next, redirect: LogInRedirect) -> Response {
    let (mut parts, body) = request.into_parts();

    let (user_id, jar, local_offset) = match authenticate(&state, &mut parts).await {
        Ok(session) => session,
        Err(reason) => {
            tracing::debug!("Sending request to log in: {reason}");
            let request = Request::from_parts(parts, body);
            return redirect.to(&build_log_in_redirect_url(&request));
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let jar = extend_auth_cookie_duration_if_needed(jar.clone(), SESSION_EXTENSION, local_offset)
        .unwrap_or_else(|error| {
            tracing::error!("Could not extend the session for user {user_id}: {error}");
            jar
        });

    let (mut parts, body) = response.into_parts();
    for value in jar.into_response().headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, value.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Guard for pages: unauthenticated requests get a 303 to the log-in page.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, LogInRedirect::Page).await
}

/// Guard for HTMX and JSON routes: unauthenticated requests get an `HX-Redirect` to the log-in page.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, LogInRedirect::Htmx).await
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{
        Extension, Router,
        extract::State,
        middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use axum_test::TestServer;
    use sha2::Digest;
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        auth::{
            AuthState, COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserID, auth_guard, auth_guard_hx,
            set_auth_cookie,
        },
        endpoints,
    };

    async fn test_handler(Extension(user_id): Extension<UserID>) -> String {
        format!("user {user_id}")
    }

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(1), state.cookie_duration, UtcOffset::UTC)
    }

    const TEST_LOG_IN_ROUTE: &str = "/stub_log_in";
    const TEST_PROTECTED_ROUTE: &str = "/protected";
    const TEST_API_ROUTE: &str = "/api/protected";

    fn get_state(cookie_duration: Duration) -> AuthState {
        let hash = sha2::Sha512::digest("nafstenoas");

        AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration,
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn get_test_server(cookie_duration: Duration) -> TestServer {
        let state = get_state(cookie_duration);

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(TEST_LOG_IN_ROUTE, post(stub_log_in_route))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn get_test_server_hx() -> TestServer {
        let state = get_state(DEFAULT_COOKIE_DURATION);

        let app = Router::new()
            .route(TEST_API_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn log_in_location(redirect_url: &str) -> String {
        let query = serde_urlencoded::to_string([("redirect_url", redirect_url)]).unwrap();
        format!("{}?{}", endpoints::LOG_IN_VIEW, query)
    }

    #[tokio::test]
    async fn protected_route_receives_user_id() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(TEST_LOG_IN_ROUTE).await;
        response.assert_status_ok();
        let token_cookie = response.cookie(COOKIE_TOKEN);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_ok();
        response.assert_text("user 1");
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[tokio::test]
    async fn auth_guard_extends_short_session() {
        let server = get_test_server(Duration::seconds(5));
        let response = server.post(TEST_LOG_IN_ROUTE).await;
        response.assert_status_ok();
        let jar = response.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;

        let auth_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            auth_cookie.expires_datetime().unwrap(),
            OffsetDateTime::now_utc() + Duration::minutes(5),
        );
        assert_eq!(auth_cookie.secure(), Some(true));
        assert_eq!(auth_cookie.http_only(), Some(true));
        assert_eq!(auth_cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn missing_cookie_redirects_to_log_in() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            log_in_location(TEST_PROTECTED_ROUTE)
        );
    }

    #[tokio::test]
    async fn invalid_cookie_redirects_to_log_in() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
        assert_eq!(
            response.header("location"),
            log_in_location(TEST_PROTECTED_ROUTE)
        );
    }

    #[tokio::test]
    async fn api_route_uses_hx_current_url_for_redirect() {
        let server = get_test_server_hx();
        let current_url = "/expenses?sort=date_desc&page=2";

        let response = server
            .get(TEST_API_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("hx-redirect"), log_in_location(current_url));
    }
}
