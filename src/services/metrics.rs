use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, Counter, CounterVec};

lazy_static! {
    pub static ref QUERIES_CREATED_COUNTER: Counter = register_counter!(
        "weather_queries_created_total",
        "Saved weather queries created"
    ).unwrap();

    pub static ref LOOKUPS_COUNTER: Counter = register_counter!(
        "weather_lookups_total",
        "Ad hoc current-weather lookups served"
    ).unwrap();

    pub static ref UPSTREAM_FAILURES_COUNTER: CounterVec = register_counter_vec!(
        "weather_upstream_failures_total",
        "Failed calls to upstream services by service",
        &["service"]
    ).unwrap();

    pub static ref EXPORTS_COUNTER: CounterVec = register_counter_vec!(
        "weather_exports_total",
        "Exports rendered by format",
        &["format"]
    ).unwrap();
}

pub fn record_upstream_failure(service: &str) {
    UPSTREAM_FAILURES_COUNTER.with_label_values(&[service]).inc();
}
