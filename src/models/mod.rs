use serde::Deserialize;
use std::fmt;
use utoipa::IntoParams;

/// Query parameters of `GET /filteredimage/`, exactly as the caller sent them.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageRequest {
    /// Public URL of the image to filter
    pub image_url: Option<String>,
    /// Lower Canny threshold
    pub lower: Option<String>,
    /// Upper Canny threshold
    pub upper: Option<String>,
}

/// Validated thresholds handed to the edge operation.
///
/// A missing side is left to the operation's own default.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Thresholds {
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Fetched,
    Processed,
    Responded,
    Cleaned,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::Fetched => "fetched",
            PipelineStage::Processed => "processed",
            PipelineStage::Responded => "responded",
            PipelineStage::Cleaned => "cleaned",
        };
        f.write_str(name)
    }
}
