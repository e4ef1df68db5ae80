//! Request metrics for the DSM REST client
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.

use metrics::{counter, histogram};

/// Metric names
pub mod names {
    /// Counter: REST round trips by method, endpoint and status
    pub const API_REQUESTS_TOTAL: &str = "compellent_api_requests_total";
    /// Histogram: REST round trip duration in seconds
    pub const API_REQUEST_DURATION_SECONDS: &str = "compellent_api_request_duration_seconds";
}

/// Record one round trip. `status` is the HTTP code, or "error" when the
/// request never got an answer.
pub fn record_request(method: &str, endpoint: &'static str, status: &str, duration_secs: f64) {
    counter!(
        names::API_REQUESTS_TOTAL,
        "method" => method.to_string(),
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(names::API_REQUEST_DURATION_SECONDS, "endpoint" => endpoint).record(duration_secs);
}
