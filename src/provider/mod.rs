//! Metrics sources the dashboard can poll.
//!
//! The dashboard only depends on `MetricsProvider`; `KubectlProvider` is the
//! implementation used by the binary.

mod kubectl;

pub use kubectl::{KubectlProvider, parse_pod_metrics, parse_pod_specs, ContainerSpec};

use std::io;

use thiserror::Error;

use crate::model::MetricRecord;

/// Error types that can occur while fetching a batch.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("unable to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("background task failed: {0}")]
    Task(String),
}

/// Source of metric batches. Called once at startup and then once per poll
/// interval, from a blocking worker thread.
pub trait MetricsProvider: Send + Sync {
    /// Fetch a complete, fresh batch of records.
    fn fetch_batch(&self) -> Result<Vec<MetricRecord>, ProviderError>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String {
        "metrics provider".to_string()
    }
}
