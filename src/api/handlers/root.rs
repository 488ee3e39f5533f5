use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

pub const EXAMPLE_IMAGE_URL: &str = "https://hips.hearstapps.com/hmg-prod.s3.amazonaws.com/images/close-up-of-tulips-blooming-in-field-royalty-free-image-1584131616.jpg?crop=0.630xw:1.00xh;0.186xw,0&resize=640:*";

#[derive(Serialize, ToSchema)]
pub struct UsageParameters {
    pub parameter1: String,
    pub parameter2: String,
    pub parameter3: String,
}

#[derive(Serialize, ToSchema)]
pub struct UsageResponse {
    pub message: String,
    pub route: String,
    pub parameters: UsageParameters,
    pub example: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "How to call the filter route", body = UsageResponse)
    ),
    tag = "system"
)]
pub async fn usage() -> Json<UsageResponse> {
    Json(UsageResponse {
        message: "Access the /filteredimage route to get a filtered image".to_string(),
        route: "/filteredimage".to_string(),
        parameters: UsageParameters {
            parameter1: "The URL of the Image(required)".to_string(),
            parameter2: "lower (optional - lower Canny threshold. upper required)".to_string(),
            parameter3: "upper (optional - upper Canny threshold. lower required)".to_string(),
        },
        example: EXAMPLE_IMAGE_URL.to_string(),
    })
}
