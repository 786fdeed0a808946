use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "photo_uploads_total",
        "Upload requests by outcome",
        &["outcome"]
    )
    .expect("register photo_uploads_total")
});

pub static LISTINGS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "photo_listings_total",
        "Listing requests by outcome",
        &["outcome"]
    )
    .expect("register photo_listings_total")
});

pub static ORPHANED_OBJECTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "photo_orphaned_objects_total",
        "Stored objects whose metadata insert failed, by cleanup result",
        &["cleanup"]
    )
    .expect("register photo_orphaned_objects_total")
});

pub static UPLOAD_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "photo_upload_duration_seconds",
        "Upload pipeline duration in seconds",
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("register photo_upload_duration")
});

pub fn record_upload(outcome: &str) {
    UPLOADS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_listing(outcome: &str) {
    LISTINGS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_orphan(cleanup: &str) {
    ORPHANED_OBJECTS_TOTAL.with_label_values(&[cleanup]).inc();
}

/// Text exposition of the default registry.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
