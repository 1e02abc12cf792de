// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Tekton pipelines operand.
//!
//! All metrics use the namespace prefix `tekton_operand_`.
//!
//! # Metrics Categories
//!
//! - **Pass Metrics** - Reconcile passes per operand and their duration
//! - **Operation Metrics** - Per-object created/updated/unchanged outcomes
//! - **Drift Metrics** - Updates observed outside an upgrade window
//! - **Cleanup Metrics** - Per-object deletion outcomes
//!
//! # Example
//!
//! ```rust,no_run
//! use tekton_operand::metrics::record_reconciliation_success;
//!
//! record_reconciliation_success("tekton-pipelines", std::time::Duration::from_millis(120));
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use std::time::Duration;

use crate::constants::METRICS_NAMESPACE;

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry; the outer process exposes it.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Pass Metrics
// ============================================================================

/// Total number of reconcile passes by operand and status
///
/// Labels:
/// - `operand`: Operand name (e.g., `tekton-pipelines`)
/// - `status`: Outcome (`success`, `error`, `skipped`)
pub static RECONCILIATION_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reconciliations_total"),
        "Total number of reconcile passes by operand and status",
    );
    let counter = CounterVec::new(opts, &["operand", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of reconcile passes in seconds
///
/// Labels:
/// - `operand`: Operand name
pub static RECONCILIATION_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
        "Duration of reconcile passes in seconds by operand",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]);
    let histogram = HistogramVec::new(opts, &["operand"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Operation Metrics
// ============================================================================

/// Total number of per-object reconcile outcomes
///
/// Labels:
/// - `kind`: Kind of object (e.g., `Pipeline`, `ConfigMap`)
/// - `result`: `created`, `updated` or `unchanged`
pub static OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_operations_total"),
        "Total number of per-object reconcile outcomes by kind and result",
    );
    let counter = CounterVec::new(opts, &["kind", "result"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of updates observed while not upgrading
///
/// Labels:
/// - `operand`: Operand name
pub static UNEXPECTED_REVERTS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_unexpected_reverts_total"),
        "Total number of managed objects reverted outside an operator upgrade",
    );
    let counter = CounterVec::new(opts, &["operand"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Cleanup Metrics
// ============================================================================

/// Total number of per-object cleanup outcomes
///
/// Labels:
/// - `kind`: Kind of object
/// - `outcome`: `deleted`, `absent` or `failed`
pub static CLEANUP_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_cleanup_total"),
        "Total number of per-object cleanup outcomes by kind",
    );
    let counter = CounterVec::new(opts, &["kind", "outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful reconcile pass
///
/// # Arguments
/// * `operand` - Operand name
/// * `duration` - Time taken for the pass
pub fn record_reconciliation_success(operand: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[operand, "success"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[operand])
        .observe(duration.as_secs_f64());
}

/// Record a failed reconcile pass
///
/// # Arguments
/// * `operand` - Operand name
/// * `duration` - Time taken before the failure
pub fn record_reconciliation_error(operand: &str, duration: Duration) {
    RECONCILIATION_TOTAL
        .with_label_values(&[operand, "error"])
        .inc();
    RECONCILIATION_DURATION_SECONDS
        .with_label_values(&[operand])
        .observe(duration.as_secs_f64());
}

/// Record a pass skipped by a feature gate
pub fn record_reconciliation_skipped(operand: &str) {
    RECONCILIATION_TOTAL
        .with_label_values(&[operand, "skipped"])
        .inc();
}

/// Record the outcome of reconciling one object
pub fn record_operation(kind: &str, result: &str) {
    OPERATIONS_TOTAL.with_label_values(&[kind, result]).inc();
}

/// Record an update observed outside an upgrade window
pub fn record_unexpected_revert(operand: &str) {
    UNEXPECTED_REVERTS_TOTAL.with_label_values(&[operand]).inc();
}

/// Record the outcome of deleting one object
pub fn record_cleanup(kind: &str, outcome: &str) {
    CLEANUP_TOTAL.with_label_values(&[kind, outcome]).inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_reconciliation_success() {
        let operand = "TestOperand";
        record_reconciliation_success(operand, Duration::from_millis(500));

        let counter = RECONCILIATION_TOTAL.with_label_values(&[operand, "success"]);
        assert!(counter.get() > 0.0);

        let histogram = RECONCILIATION_DURATION_SECONDS.with_label_values(&[operand]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_operation_and_cleanup() {
        record_operation("MetricsTestKind", "created");
        record_cleanup("MetricsTestKind", "absent");

        assert!(
            OPERATIONS_TOTAL
                .with_label_values(&["MetricsTestKind", "created"])
                .get()
                > 0.0
        );
        assert!(
            CLEANUP_TOTAL
                .with_label_values(&["MetricsTestKind", "absent"])
                .get()
                > 0.0
        );
    }

    #[test]
    fn test_gather_metrics() {
        record_reconciliation_error("GatherTest", Duration::from_millis(100));
        record_unexpected_revert("GatherTest");

        let metrics_text = gather_metrics().unwrap();
        assert!(
            metrics_text.contains("tekton_operand"),
            "Metrics should contain namespace prefix"
        );
        assert!(metrics_text.contains("reconciliations_total"));
        assert!(metrics_text.contains("unexpected_reverts_total"));
    }
}
