//! The route for logging in a user with their username and password.
//! The cookie module handles the lower level token and cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        User, UserID, set_auth_cookie,
        user::{get_user_by_id, get_user_by_username},
    },
};

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client to log in.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password hash in the database.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// The username entered during log-in.
    pub username: String,
    /// The password entered during log-in.
    pub password: String,
}

/// The public details of a user that are safe to send to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's username.
    pub username: String,
    /// The user's email address.
    pub email: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
        }
    }
}

/// The body of a successful log-in response.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct LogInResponse {
    /// The user that was logged in.
    pub user: UserProfile,
}

/// Handler for log-in requests.
///
/// On a successful log-in request, the auth cookie is set and the user's
/// profile is returned.
///
/// # Errors
///
/// Returns an [Error::InvalidCredentials] if the username is not registered
/// or the password is wrong, or an internal error if the password could not
/// be verified or the cookie could not be set.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Json(credentials): Json<LogInData>,
) -> Result<(PrivateCookieJar, Json<LogInResponse>), Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_username(&credentials.username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        tracing::info!("Failed log-in attempt for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((
        jar,
        Json(LogInResponse { user: user.into() }),
    ))
}

/// Handler for fetching the profile of the logged in user.
///
/// # Errors
///
/// Returns an [Error::Unauthorized] if the user in the token no longer exists.
pub async fn get_current_user(
    State(state): State<LoginState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<LogInResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    match get_user_by_id(user_id, &connection) {
        Ok(user) => Ok(Json(LogInResponse { user: user.into() })),
        Err(Error::NotFound) => Err(Error::Unauthorized),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod log_in_tests {
    use axum::{
        Router,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        auth::{COOKIE_TOKEN, auth_guard},
        test_utils::{TEST_EMAIL, TEST_PASSWORD, TEST_USERNAME, get_test_state, insert_test_user},
    };

    use super::{LogInResponse, UserProfile, get_current_user, post_log_in};

    fn get_test_server() -> TestServer {
        let state = get_test_state();
        insert_test_user(&state);

        let app = Router::new()
            .route("/me", get(get_current_user))
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                auth_guard,
            ))
            .route("/log_in", post(post_log_in))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn test_profile() -> UserProfile {
        UserProfile {
            username: TEST_USERNAME.to_owned(),
            email: TEST_EMAIL.to_owned(),
        }
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let server = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"username": TEST_USERNAME, "password": TEST_PASSWORD}))
            .await;

        response.assert_status_ok();
        response.assert_json(&LogInResponse {
            user: test_profile(),
        });
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let server = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"username": TEST_USERNAME, "password": "wrongpassword"}))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "Invalid credentials"}));
        assert!(response.cookies().get(COOKIE_TOKEN).is_none());
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_username() {
        let server = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"username": "nobody", "password": TEST_PASSWORD}))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({"error": "Invalid credentials"}));
    }

    #[tokio::test]
    async fn current_user_requires_log_in() {
        let server = get_test_server();

        server.get("/me").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn current_user_returns_logged_in_user() {
        let server = get_test_server();
        let jar = server
            .post("/log_in")
            .json(&json!({"username": TEST_USERNAME, "password": TEST_PASSWORD}))
            .await
            .cookies();

        let response = server.get("/me").add_cookies(jar).await;

        response.assert_status_ok();
        response.assert_json(&LogInResponse {
            user: test_profile(),
        });
    }
}
