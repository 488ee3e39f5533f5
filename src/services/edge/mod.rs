//! Edge detection boundary.
//!
//! [`EdgeOperation`] is the out-of-process capability: an input image path
//! and optional thresholds go in, the path of a newly written image comes
//! out. [`EdgeProcessor`] wraps any operation with a timeout and output
//! checks so the pipeline never depends on a concrete backend.

mod builtin;
mod canny;
mod command;
mod processor;

pub use builtin::{BuiltinEdgeOperation, DEFAULT_LOWER, DEFAULT_UPPER};
pub use canny::detect_edges;
pub use command::{CommandEdgeOperation, OUTPUT_DIR_ENV};
pub use processor::EdgeProcessor;

use crate::config::ServiceConfig;
use crate::models::Thresholds;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to start edge command: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("edge operation exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("edge operation produced no output path")]
    NoOutput,

    #[error("edge operation reported {} but no such file exists", .0.display())]
    MissingOutput(PathBuf),

    #[error("edge operation returned its input path as output")]
    OutputIsInput,

    #[error("edge operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("edge operation is not configured: {0}")]
    NotConfigured(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for edge detection backends
#[async_trait::async_trait]
pub trait EdgeOperation: Send + Sync {
    /// Short backend identifier used in logs and the health report
    fn name(&self) -> &'static str;

    /// Run edge detection on `input`, returning the path of a new file
    async fn find_edges(&self, input: &Path, thresholds: Thresholds)
    -> Result<PathBuf, ProcessError>;

    /// Check if the backend is usable
    async fn health_check(&self) -> bool;
}

/// Factory function to create the configured edge backend
pub fn create_edge_operation(config: &ServiceConfig) -> Arc<dyn EdgeOperation> {
    let builtin =
        || -> Arc<dyn EdgeOperation> { Arc::new(BuiltinEdgeOperation::new(config.temp_dir.clone())) };

    match config.edge_backend.to_lowercase().as_str() {
        "command" | "external" => match CommandEdgeOperation::from_config(config) {
            Ok(operation) => Arc::new(operation),
            Err(e) => {
                tracing::warn!("{}, falling back to builtin edge detection", e);
                builtin()
            }
        },
        "builtin" | "native" => builtin(),
        other => {
            tracing::warn!("Unknown edge backend '{}', using builtin", other);
            builtin()
        }
    }
}
