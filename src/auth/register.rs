//! The route for creating a new user account.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{
        log_in::UserProfile,
        user::{create_user, user_exists},
    },
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for checking and storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The details sent by the client to create an account.
///
/// Missing fields deserialize as empty strings so that they are reported as
/// [Error::MissingFields] rather than a JSON rejection.
#[derive(Serialize, Deserialize)]
pub struct RegisterData {
    /// The name the user logs in with.
    #[serde(default)]
    pub username: String,
    /// The user's email address.
    #[serde(default)]
    pub email: String,
    /// The password in plain text, checked for strength before hashing.
    #[serde(default)]
    pub password: String,
}

/// The body of a successful registration response.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// A confirmation message for the client.
    pub message: String,
    /// The account that was created.
    pub user: UserProfile,
}

/// Create a new user from a username, email and password.
///
/// # Errors
///
/// Returns a:
/// - [Error::MissingFields] if any of the fields are blank,
/// - [Error::UserAlreadyExists] if the username or email is taken,
/// - [Error::TooWeak] if the password is easy to guess.
pub async fn register_user(
    State(state): State<RegistrationState>,
    Json(user_data): Json<RegisterData>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    let username = user_data.username.trim();
    let email = user_data.email.trim();

    if username.is_empty() || email.is_empty() || user_data.password.is_empty() {
        return Err(Error::MissingFields);
    }

    {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        if user_exists(username, email, &connection)? {
            return Err(Error::UserAlreadyExists);
        }
    }

    let validated_password = ValidatedPassword::new(&user_data.password, &[username, email])?;
    let password_hash = tokio::task::spawn_blocking(move || {
        PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)
    })
    .await
    .map_err(|error| Error::HashingError(error.to_string()))??;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;
    let user = create_user(username, email, password_hash, &connection)?;

    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered".to_owned(),
            user: user.into(),
        }),
    ))
}
