// Selection analytics: tracking on selection, aggregated read endpoints.

pub mod handlers;
pub mod insights;
pub mod tracking;
