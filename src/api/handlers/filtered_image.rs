use crate::AppState;
use crate::api::error::AppError;
use crate::models::ImageRequest;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{StatusCode, header},
    response::Response,
};

/// Fetch an image, run edge detection on it and stream the result back.
///
/// Every file created for the request is removed once the response body has
/// been written or the connection was dropped.
#[utoipa::path(
    get,
    path = "/filteredimage",
    params(ImageRequest),
    responses(
        (status = 200, description = "Edge map of the requested image", body = Vec<u8>, content_type = "image/png"),
        (status = 415, description = "image_url is not a valid URL", body = ErrorResponse),
        (status = 422, description = "image_url is missing", body = ErrorResponse),
        (status = 500, description = "Image could not be fetched or processed, or a threshold is not a number", body = ErrorResponse)
    ),
    tag = "images"
)]
pub async fn filtered_image(
    State(state): State<AppState>,
    Query(request): Query<ImageRequest>,
) -> Result<Response, AppError> {
    let image = state.pipeline.run(&request).await.map_err(|e| {
        tracing::warn!("Filter request failed at {} stage: {}", e.stage(), e);
        AppError::from(e)
    })?;

    let content_type = image.content_type().to_string();
    let stream = image.open().await.map_err(|e| {
        AppError::Internal(format!("failed to open filtered image: {}", e))
    })?;
    let content_length = stream.len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("failed to build response: {}", e)))
}
