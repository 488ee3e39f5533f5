use super::{EdgeOperation, ProcessError};
use crate::models::Thresholds;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Bounded invocation of an [`EdgeOperation`].
#[derive(Clone)]
pub struct EdgeProcessor {
    operation: Arc<dyn EdgeOperation>,
    timeout: Duration,
}

impl EdgeProcessor {
    pub fn new(operation: Arc<dyn EdgeOperation>, timeout: Duration) -> Self {
        Self { operation, timeout }
    }

    pub fn operation(&self) -> &Arc<dyn EdgeOperation> {
        &self.operation
    }

    /// Runs edge detection on `input` and checks the reported output.
    ///
    /// Thresholds are forwarded exactly as given, including when only one
    /// side is present.
    pub async fn process(&self, input: &Path, thresholds: Thresholds) -> Result<PathBuf, ProcessError> {
        if thresholds.is_empty() {
            tracing::debug!("No thresholds supplied, {} uses its defaults", self.operation.name());
        } else if thresholds.lower.is_some() != thresholds.upper.is_some() {
            tracing::debug!(
                "Only one threshold supplied (lower={:?}, upper={:?}), forwarding as-is",
                thresholds.lower,
                thresholds.upper
            );
        }

        let output = tokio::time::timeout(self.timeout, self.operation.find_edges(input, thresholds))
            .await
            .map_err(|_| {
                tracing::error!(
                    "⏱️  {} edge operation timed out after {:?}",
                    self.operation.name(),
                    self.timeout
                );
                ProcessError::Timeout(self.timeout)
            })??;

        if output == input {
            return Err(ProcessError::OutputIsInput);
        }

        if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
            return Err(ProcessError::MissingOutput(output));
        }

        Ok(output)
    }
}
