//! Prometheus metrics for broadcast groups
//!
//! This module tracks:
//! - Ticks and deliveries per group
//! - Time spent delivering one tick
//! - Groups currently running and groups that failed to start
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! Until then, and if initialization fails, metrics operations are no-ops.

use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all broadcast metrics
struct BroadcastMetrics {
    ticks: CounterVec,
    deliveries: CounterVec,
    delivery_duration: HistogramVec,
    running_groups: Gauge,
    start_failures: CounterVec,
}

/// Global storage for broadcast metrics
static BROADCAST_METRICS: OnceLock<BroadcastMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Call once at startup. Repeated calls return `Ok(())` without
/// registering anything.
///
/// # Example
///
/// ```ignore
/// if let Err(e) = automessages::metrics::init_metrics() {
///     eprintln!("Warning: Metrics initialization failed: {}", e);
/// }
/// ```
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = BroadcastMetrics {
        ticks: register_counter_vec!(
            "automessages_ticks_total",
            "Total ticks that sent a message, by group",
            &["group"]
        )?,
        deliveries: register_counter_vec!(
            "automessages_deliveries_total",
            "Total sends handed to the proxy, by group and mode",
            &["group", "mode"]
        )?,
        delivery_duration: register_histogram_vec!(
            "automessages_delivery_duration_seconds",
            "Time spent delivering one tick in seconds",
            &["group"],
            vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
        )?,
        running_groups: register_gauge!(
            "automessages_running_groups",
            "Number of broadcast groups currently running"
        )?,
        start_failures: register_counter_vec!(
            "automessages_start_failures_total",
            "Groups that were not started, by reason",
            &["reason"]
        )?,
    };

    BROADCAST_METRICS
        .set(metrics)
        .map_err(|_| "Broadcast metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record one tick of a group
pub fn record_tick(group: &str, mode: &str, sends: usize) {
    let Some(m) = BROADCAST_METRICS.get() else {
        return;
    };

    m.ticks.with_label_values(&[group]).inc();
    if sends > 0 {
        m.deliveries
            .with_label_values(&[group, mode])
            .inc_by(sends as f64);
    }
}

/// Set the number of running groups
pub fn set_running_groups(count: usize) {
    if let Some(m) = BROADCAST_METRICS.get() {
        m.running_groups.set(count as f64);
    }
}

/// Record a group that failed validation
pub fn record_start_failure(reason: &str) {
    if let Some(m) = BROADCAST_METRICS.get() {
        m.start_failures.with_label_values(&[reason]).inc();
    }
}

/// Histogram timer guard that records duration on drop
pub struct MetricsTimer {
    timer: Option<prometheus::HistogramTimer>,
}

impl MetricsTimer {
    fn new(timer: prometheus::HistogramTimer) -> Self {
        Self { timer: Some(timer) }
    }

    /// Create a no-op timer when metrics are not initialized
    fn noop() -> Self {
        Self { timer: None }
    }
}

impl Drop for MetricsTimer {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop_and_record();
        }
    }
}

/// Start timing one delivery
pub fn start_delivery_timer(group: &str) -> MetricsTimer {
    match BROADCAST_METRICS.get() {
        Some(m) => MetricsTimer::new(m.delivery_duration.with_label_values(&[group]).start_timer()),
        None => MetricsTimer::noop(),
    }
}

// ============================================================================
// Tests
// ============================================================================
