use super::{EdgeOperation, ProcessError, canny};
use crate::models::Thresholds;
use crate::services::cleaner::{FileCleaner, TempFiles};
use crate::utils::temp_path::unique_temp_path;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const DEFAULT_LOWER: f64 = 100.0;
pub const DEFAULT_UPPER: f64 = 200.0;

/// In-process edge detection on the `image` crate.
///
/// Writes a PNG edge map next to the other request files. A missing
/// threshold takes its default; inverted thresholds are swapped.
pub struct BuiltinEdgeOperation {
    output_dir: PathBuf,
}

impl BuiltinEdgeOperation {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    fn resolve(thresholds: Thresholds) -> (f32, f32) {
        let lower = thresholds.lower.unwrap_or(DEFAULT_LOWER) as f32;
        let upper = thresholds.upper.unwrap_or(DEFAULT_UPPER) as f32;
        if lower > upper {
            (upper, lower)
        } else {
            (lower, upper)
        }
    }
}

/// Raised when the awaiting future is dropped before the blocking work ends.
struct Abandoned(Arc<AtomicBool>);

impl Drop for Abandoned {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EdgeOperation for BuiltinEdgeOperation {
    fn name(&self) -> &'static str {
        "builtin"
    }

    async fn find_edges(
        &self,
        input: &Path,
        thresholds: Thresholds,
    ) -> Result<PathBuf, ProcessError> {
        let (lower, upper) = Self::resolve(thresholds);
        let output = unique_temp_path(&self.output_dir, "edges", "png");

        // Drop order matters: the flag is raised before the guard deletes,
        // so a late write either sees the flag or is removed by the guard.
        let mut pending = TempFiles::new(FileCleaner);
        pending.track(&output);
        let abandoned = Arc::new(AtomicBool::new(false));
        let _abandoned = Abandoned(abandoned.clone());

        let source = input.to_path_buf();
        let target = output.clone();
        tokio::task::spawn_blocking(move || -> Result<(), ProcessError> {
            let gray = image::open(&source)
                .map_err(|e| ProcessError::Image(format!("failed to decode {}: {}", source.display(), e)))?
                .to_luma8();

            let edges = canny::detect_edges(&gray, lower, upper);
            edges
                .save_with_format(&target, ImageFormat::Png)
                .map_err(|e| ProcessError::Image(format!("failed to write edge map: {}", e)))?;

            if abandoned.load(Ordering::SeqCst) {
                FileCleaner.cleanup(&[&target]);
            }
            Ok(())
        })
        .await
        .map_err(|e| ProcessError::Image(format!("edge detection task failed: {}", e)))??;

        pending.disarm();
        tracing::debug!(
            "Builtin edge detection wrote {} (lower={}, upper={})",
            output.display(),
            lower,
            upper
        );
        Ok(output)
    }

    async fn health_check(&self) -> bool {
        tokio::fs::metadata(&self.output_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}
