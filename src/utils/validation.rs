use crate::models::{ImageRequest, Thresholds};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("image_url is missing")]
    MissingUrl,

    #[error("'{0}' is not a valid absolute URL")]
    InvalidUrl(String),

    #[error("threshold '{name}' must be a number, got '{value}'")]
    InvalidThreshold { name: &'static str, value: String },
}

/// Returns true for syntactically well-formed absolute URLs (scheme + authority).
///
/// No network access is performed.
pub fn validate_url(candidate: &str) -> bool {
    parse_image_url(candidate).is_some()
}

/// Parses an absolute URL that carries a non-empty host.
pub fn parse_image_url(candidate: &str) -> Option<Url> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return None;
    }

    let url = Url::parse(trimmed).ok()?;
    if url.cannot_be_a_base() {
        return None;
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

/// Parses an optional threshold query value.
///
/// Absent or blank values are `None`; anything else must be a finite number.
pub fn parse_threshold(
    name: &'static str,
    raw: Option<&str>,
) -> Result<Option<f64>, ValidationError> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ValidationError::InvalidThreshold {
            name,
            value: raw.to_string(),
        }),
    }
}

/// Full validation of an incoming request. Runs before any resource is allocated.
pub fn validate_request(request: &ImageRequest) -> Result<(Url, Thresholds), ValidationError> {
    let raw_url = request
        .image_url
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingUrl)?;

    let url = parse_image_url(raw_url)
        .ok_or_else(|| ValidationError::InvalidUrl(raw_url.to_string()))?;

    let lower = parse_threshold("lower", request.lower.as_deref())?;
    let upper = parse_threshold("upper", request.upper.as_deref())?;

    Ok((url, Thresholds::new(lower, upper)))
}
