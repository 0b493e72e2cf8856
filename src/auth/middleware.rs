//! Authentication middleware that validates the token cookie and refreshes long sessions.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::{
        Token,
        cookie::{get_token_from_cookies, set_auth_cookie},
    },
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Whether `token` has used up more than half of `cookie_duration`.
fn needs_refresh(token: &Token, cookie_duration: Duration, now: OffsetDateTime) -> bool {
    token.expires_at - now < cookie_duration / 2
}

/// Middleware function that checks for a valid auth token cookie.
///
/// The user ID is placed into the request and the request executed normally
/// if the token is valid, otherwise a 401 JSON error is returned.
/// Tokens past the halfway point of their lifetime are reissued with a fresh
/// expiry on the way out.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}.");
            return Error::Unauthorized.into_response();
        }
    };
    let token = match get_token_from_cookies(&jar) {
        Ok(token) => token,
        Err(error) => return error.into_response(),
    };

    parts.extensions.insert(token.user_id);
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    if !needs_refresh(&token, state.cookie_duration, OffsetDateTime::now_utc()) {
        return response;
    }

    let jar = match set_auth_cookie(jar, token.user_id, state.cookie_duration) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error refreshing auth cookie: {err}. Keeping the old cookie.");
            return response;
        }
    };

    let (mut parts, body) = response.into_parts();
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
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
    use serde_json::json;
    use sha2::Digest;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, Token, UserID, auth_guard,
            middleware::{AuthState, needs_refresh},
            set_auth_cookie,
        },
    };

    async fn test_handler(Extension(user_id): Extension<UserID>) -> String {
        format!("Hello, user {user_id}!")
    }

    async fn stub_log_in_route(
        State(state): State<AuthState>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(1), state.cookie_duration)
    }

    /// Issues a token that is already past the halfway point of the default duration.
    async fn stub_short_log_in_route(jar: PrivateCookieJar) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(1), Duration::hours(1))
    }

    const TEST_LOG_IN_ROUTE_PATH: &str = "/log_in";
    const TEST_SHORT_LOG_IN_ROUTE_PATH: &str = "/log_in_short";
    const TEST_PROTECTED_ROUTE: &str = "/protected";

    fn get_test_server(cookie_duration: Duration) -> TestServer {
        let hash = sha2::Sha512::digest("nafstenoas");
        let state = AuthState {
            cookie_key: Key::from(&hash),
            cookie_duration,
        };

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(test_handler))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(TEST_LOG_IN_ROUTE_PATH, post(stub_log_in_route))
            .route(TEST_SHORT_LOG_IN_ROUTE_PATH, post(stub_short_log_in_route))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn get_protected_route_with_valid_cookie() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let response = server.post(TEST_LOG_IN_ROUTE_PATH).await;

        response.assert_status_ok();
        let token_cookie = response.cookie(COOKIE_TOKEN);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_ok();
        response.assert_text("Hello, user 1!");
    }

    #[tokio::test]
    async fn get_protected_route_without_cookie_is_unauthorized() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_unauthorized();
        response.assert_json(&json!({"error": "authentication required"}));
    }

    #[tokio::test]
    async fn get_protected_route_with_invalid_cookie_is_unauthorized() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn get_protected_route_with_expired_token_is_unauthorized() {
        let server = get_test_server(Duration::seconds(-1));
        let response = server.post(TEST_LOG_IN_ROUTE_PATH).await;

        response.assert_status_ok();
        let token_cookie = response.cookie(COOKIE_TOKEN);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn fresh_token_is_not_reissued() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let jar = server.post(TEST_LOG_IN_ROUTE_PATH).await.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;

        response.assert_status_ok();
        assert!(
            response.cookies().get(COOKIE_TOKEN).is_none(),
            "expected the auth guard to leave a fresh token alone"
        );
    }

    #[tokio::test]
    async fn stale_token_is_reissued_with_full_duration() {
        let server = get_test_server(DEFAULT_COOKIE_DURATION);
        let jar = server.post(TEST_SHORT_LOG_IN_ROUTE_PATH).await.cookies();

        let response = server.get(TEST_PROTECTED_ROUTE).add_cookies(jar).await;

        response.assert_status_ok();
        let cookie = response.cookie(COOKIE_TOKEN);
        let expires_at = cookie.expires_datetime().unwrap();
        let want = OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION;
        assert!(
            (expires_at - want).abs() < Duration::seconds(2),
            "got expiry {expires_at:?}, want {want:?}"
        );
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn needs_refresh_after_half_the_duration() {
        let now = OffsetDateTime::now_utc();
        let token = |remaining: Duration| Token {
            user_id: UserID::new(1),
            expires_at: now + remaining,
        };

        assert!(!needs_refresh(&token(Duration::hours(20)), Duration::days(1), now));
        assert!(needs_refresh(&token(Duration::hours(11)), Duration::days(1), now));
    }
}
