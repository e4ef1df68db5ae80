//! Prometheus metrics for the NFS provisioner
//!
//! The provisioner runs once per invocation, so instead of serving
//! `/metrics` it renders the registry to a text file that a node exporter
//! textfile collector can pick up.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Metric names
pub mod names {
    /// Counter: Total provisioning workflows by type and status
    pub const OPERATIONS_TOTAL: &str = "nfs_provisioner_operations_total";
    /// Histogram: Duration of provisioning workflows in seconds
    pub const OPERATION_DURATION_SECONDS: &str = "nfs_provisioner_operation_duration_seconds";
    /// Counter: Array objects created by kind (volume/export)
    pub const OBJECTS_CREATED_TOTAL: &str = "nfs_provisioner_objects_created_total";
    /// Counter: Array objects deleted by kind (volume/export)
    pub const OBJECTS_DELETED_TOTAL: &str = "nfs_provisioner_objects_deleted_total";
}

/// Install the Prometheus recorder globally and return a handle for rendering.
pub fn init_metrics() -> Result<PrometheusHandle, Box<dyn std::error::Error + Send + Sync>> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus recorder installed");
    Ok(handle)
}

/// Write rendered metrics to `path`, replacing it atomically.
pub fn write_textfile(path: impl AsRef<Path>, rendered: &str) -> std::io::Result<()> {
    let path = path.as_ref();
    let tmp_path = path.with_extension("prom.tmp");

    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(rendered.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;

    info!(path = %path.display(), "Metrics written");
    Ok(())
}

/// Record a provisioning workflow with its result
pub fn record_operation(operation: &str, status: &str, duration_secs: f64) {
    counter!(
        names::OPERATIONS_TOTAL,
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(names::OPERATION_DURATION_SECONDS, "operation" => operation.to_string())
        .record(duration_secs);
}

/// Record a created array object
pub fn record_created(kind: &'static str) {
    counter!(names::OBJECTS_CREATED_TOTAL, "kind" => kind).increment(1);
}

/// Record deleted array objects
pub fn record_deleted(kind: &'static str, count: u64) {
    counter!(names::OBJECTS_DELETED_TOTAL, "kind" => kind).increment(count);
}

/// Helper for timing operations
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    /// Start timing an operation
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    /// Complete the operation with success
    pub fn success(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_operation(&self.operation, "success", duration);
    }

    /// Complete the operation with failure
    pub fn failure(self, error_code: &str) {
        let duration = self.start.elapsed().as_secs_f64();
        record_operation(&self.operation, error_code, duration);
    }
}
