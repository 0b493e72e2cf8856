//! Summarises transactions into the totals, category breakdown and monthly
//! trend shown on the dashboard.

mod endpoint;
mod month;
mod summary;

pub use endpoint::get_analytics_summary;
pub use month::{MonthKey, validate_records};
pub use summary::{AnalyticsSummary, MonthlyTotals, summarize};
