//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState, Error,
    analytics::get_analytics_summary,
    auth::{auth_guard, get_current_user, post_log_in, post_log_out, register_user},
    endpoints,
    export::export_csv,
    transaction::get_transactions_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index))
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::REGISTER, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(endpoints::CURRENT_USER, get(get_current_user))
        .route(endpoints::TRANSACTIONS, get(get_transactions_endpoint))
        .route(endpoints::ANALYTICS_SUMMARY, get(get_analytics_summary))
        .route(endpoints::EXPORT_CSV, post(export_csv))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot").into_response()
}

/// The root path '/' replies with a banner so clients can check the server is up.
async fn get_index() -> &'static str {
    "Finboard API is running"
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}
