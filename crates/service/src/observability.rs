use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static REMOTE_CALLS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "itinerary_api_remote_calls_total",
        "Total calls made to the Drive and Sheets APIs",
        &["api"]
    )
    .expect("register remote_calls_total")
});

pub static REMOTE_ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "itinerary_api_remote_errors_total",
        "Failed calls to the Drive and Sheets APIs, by remote status (0 for transport errors)",
        &["api", "status"]
    )
    .expect("register remote_errors_total")
});

pub static REMOTE_CALL_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "itinerary_api_remote_call_duration_seconds",
        "Remote call duration in seconds",
        &["api"],
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register remote_call_duration")
});

pub fn record_call(api: &str, seconds: f64) {
    REMOTE_CALLS_TOTAL.with_label_values(&[api]).inc();
    REMOTE_CALL_DURATION.with_label_values(&[api]).observe(seconds);
}

pub fn record_error(api: &str, status: u16) {
    REMOTE_ERRORS_TOTAL
        .with_label_values(&[api, &status.to_string()])
        .inc();
}

pub fn encode_metrics() -> (u16, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (500, format!("metrics encode error: {e}"));
    }
    (200, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_calls_show_up_in_exposition() {
        record_call("drive", 0.02);
        record_error("sheets", 404);
        let (status, body) = encode_metrics();
        assert_eq!(status, 200);
        assert!(body.contains("itinerary_api_remote_calls_total"));
        assert!(body.contains("status=\"404\""));
    }
}
