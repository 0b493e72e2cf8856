//! The API endpoints URIs.

/// The root route which replies with a short banner.
pub const ROOT: &str = "/";
/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for creating a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/auth/logout";
/// The route for fetching the logged in user.
pub const CURRENT_USER: &str = "/api/auth/me";
/// The route to list, filter, sort and page transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for the revenue, expense and category analytics.
pub const ANALYTICS_SUMMARY: &str = "/api/analytics/summary";
/// The route to download transactions as a CSV file.
pub const EXPORT_CSV: &str = "/api/export/csv";
