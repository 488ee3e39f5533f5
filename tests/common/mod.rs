#![allow(dead_code)]

use axum::{
    Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use image_filter_service::config::ServiceConfig;
use image_filter_service::models::Thresholds;
use image_filter_service::services::edge::{EdgeOperation, EdgeProcessor, ProcessError};
use image_filter_service::services::fetcher::ImageFetcher;
use image_filter_service::services::pipeline::RequestPipeline;
use image_filter_service::services::retry::RetryPolicy;
use image_filter_service::utils::temp_path::unique_temp_path;
use image_filter_service::{AppState, create_app};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn sample_png() -> Vec<u8> {
    let img = RgbImage::from_fn(32, 24, |x, y| {
        image::Rgb([(x * 8) as u8, (y * 10) as u8, if (8..24).contains(&x) { 255 } else { 0 }])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Local origin serving images and failure cases.
pub struct ImageServer {
    pub base: String,
    pub flaky_hits: Arc<AtomicUsize>,
}

impl ImageServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

pub async fn spawn_image_server() -> ImageServer {
    let png = sample_png();
    let flaky_hits = Arc::new(AtomicUsize::new(0));

    let image = png.clone();
    let flaky_image = png.clone();
    let truncated = png[..40].to_vec();
    let hits = flaky_hits.clone();

    let app = Router::new()
        .route(
            "/tulips.png",
            get(move || {
                let body = image.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], body) }
            }),
        )
        // Lies about its type; sniffing decides
        .route(
            "/disguised",
            get(move || {
                let body = png.clone();
                async move { ([(header::CONTENT_TYPE, "text/plain")], body) }
            }),
        )
        // Valid signature, cut off mid-stream
        .route(
            "/truncated.png",
            get(move || {
                let body = truncated.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], body) }
            }),
        )
        .route(
            "/missing.png",
            get(|| async { StatusCode::NOT_FOUND.into_response() }),
        )
        .route(
            "/page.html",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    "<html><body>not an image</body></html>",
                )
            }),
        )
        .route(
            "/flaky.png",
            get(move || {
                let body = flaky_image.clone();
                let hits = hits.clone();
                async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        StatusCode::SERVICE_UNAVAILABLE.into_response()
                    } else {
                        ([(header::CONTENT_TYPE, "image/png")], body).into_response()
                    }
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ImageServer {
        base: format!("http://{}", addr),
        flaky_hits,
    }
}

/// Nothing listens on port 1.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1/tulips.png";

pub fn filter_uri(image_url: &str, extra: &str) -> String {
    format!(
        "/filteredimage?image_url={}{}",
        utf8_percent_encode(image_url, NON_ALPHANUMERIC),
        extra
    )
}

pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

pub fn test_fetcher(temp_dir: &Path, max_bytes: u64, retry: RetryPolicy) -> ImageFetcher {
    ImageFetcher::new(test_client(), temp_dir.to_path_buf(), max_bytes, retry)
}

pub fn test_state(temp_dir: &Path, operation: Arc<dyn EdgeOperation>) -> AppState {
    let fetcher = test_fetcher(temp_dir, 1024 * 1024, RetryPolicy::with_max_attempts(1));
    let processor = EdgeProcessor::new(operation, Duration::from_secs(10));

    AppState {
        pipeline: Arc::new(RequestPipeline::new(fetcher, processor)),
        config: ServiceConfig {
            temp_dir: temp_dir.to_path_buf(),
            ..ServiceConfig::development()
        },
    }
}

pub fn test_app(temp_dir: &Path, operation: Arc<dyn EdgeOperation>) -> Router {
    create_app(test_state(temp_dir, operation))
}

pub fn dir_entries(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

/// Inverts the image and records every call.
pub struct RecordingOperation {
    output_dir: PathBuf,
    pub calls: Mutex<Vec<(PathBuf, Thresholds)>>,
}

impl RecordingOperation {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, Thresholds)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EdgeOperation for RecordingOperation {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn find_edges(&self, input: &Path, thresholds: Thresholds) -> Result<PathBuf, ProcessError> {
        self.calls
            .lock()
            .unwrap()
            .push((input.to_path_buf(), thresholds));

        let mut img = image::open(input).map_err(|e| ProcessError::Image(e.to_string()))?;
        img.invert();

        let output = unique_temp_path(&self.output_dir, "edges", "png");
        img.save_with_format(&output, ImageFormat::Png)
            .map_err(|e| ProcessError::Image(e.to_string()))?;
        Ok(output)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

/// Always fails like a crashing external tool.
pub struct FailingOperation;

#[async_trait::async_trait]
impl EdgeOperation for FailingOperation {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn find_edges(&self, _input: &Path, _thresholds: Thresholds) -> Result<PathBuf, ProcessError> {
        Err(ProcessError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "segmentation fault".to_string(),
        })
    }

    async fn health_check(&self) -> bool {
        false
    }
}

pub struct PanickingOperation;

#[async_trait::async_trait]
impl EdgeOperation for PanickingOperation {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn find_edges(&self, _input: &Path, _thresholds: Thresholds) -> Result<PathBuf, ProcessError> {
        panic!("edge backend exploded");
    }

    async fn health_check(&self) -> bool {
        true
    }
}
