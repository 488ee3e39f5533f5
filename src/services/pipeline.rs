use crate::config::ServiceConfig;
use crate::models::{ImageRequest, PipelineStage};
use crate::services::cleaner::{FileCleaner, TempFiles};
use crate::services::edge::{EdgeOperation, EdgeProcessor, ProcessError};
use crate::services::fetcher::{FetchError, ImageFetcher};
use crate::utils::content_type::content_type_for;
use crate::utils::validation::{ValidationError, validate_request};
use bytes::Bytes;
use futures::Stream;
use mime::Mime;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("processing failed: {0}")]
    Process(#[from] ProcessError),
}

impl PipelineError {
    /// Last stage reached before the failure.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Validation(_) => PipelineStage::Received,
            PipelineError::Fetch(_) => PipelineStage::Validated,
            PipelineError::Process(_) => PipelineStage::Fetched,
        }
    }
}

/// Successful pipeline output. Owns every file created for the request.
#[derive(Debug)]
pub struct FilteredImage {
    path: PathBuf,
    content_type: Mime,
    files: TempFiles,
}

impl FilteredImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    /// Opens the output for transmission, handing file ownership to the stream.
    ///
    /// If opening fails the files are released right away.
    pub async fn open(self) -> std::io::Result<ImageStream> {
        let file = File::open(&self.path).await?;
        let len = file.metadata().await?.len();
        Ok(ImageStream {
            inner: ReaderStream::new(file),
            len,
            sent: 0,
            finished: false,
            files: self.files,
        })
    }
}

/// Response body over the filtered image.
///
/// Temporary files are deleted when the stream is dropped, which the server
/// does once the body has been fully written or the client went away.
pub struct ImageStream {
    inner: ReaderStream<File>,
    len: u64,
    sent: u64,
    finished: bool,
    files: TempFiles,
}

impl ImageStream {
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The server may stop polling once `Content-Length` bytes are out.
    fn is_complete(&self) -> bool {
        self.finished || self.sent >= self.len
    }
}

impl Stream for ImageStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let next = Pin::new(&mut this.inner).poll_next(cx);
        match &next {
            Poll::Ready(Some(Ok(chunk))) => this.sent += chunk.len() as u64,
            Poll::Ready(None) => this.finished = true,
            _ => {}
        }
        next
    }
}

impl Drop for ImageStream {
    fn drop(&mut self) {
        if self.is_complete() {
            tracing::debug!(stage = %PipelineStage::Responded, "Filtered image sent ({} bytes)", self.len);
        } else {
            tracing::warn!("Response closed before the filtered image was fully sent");
        }
        tracing::debug!(
            stage = %PipelineStage::Cleaned,
            "Releasing {} request file(s)",
            self.files.paths().len()
        );
    }
}

/// validate → fetch → process, with every created file tracked for cleanup.
pub struct RequestPipeline {
    fetcher: ImageFetcher,
    processor: EdgeProcessor,
    cleaner: FileCleaner,
}

impl RequestPipeline {
    pub fn new(fetcher: ImageFetcher, processor: EdgeProcessor) -> Self {
        Self {
            fetcher,
            processor,
            cleaner: FileCleaner,
        }
    }

    pub fn from_config(
        config: &ServiceConfig,
        operation: Arc<dyn EdgeOperation>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            ImageFetcher::from_config(config)?,
            EdgeProcessor::new(operation, config.process_timeout()),
        ))
    }

    pub fn processor(&self) -> &EdgeProcessor {
        &self.processor
    }

    pub fn fetcher(&self) -> &ImageFetcher {
        &self.fetcher
    }

    pub async fn run(&self, request: &ImageRequest) -> Result<FilteredImage, PipelineError> {
        tracing::debug!(stage = %PipelineStage::Received, "Filter request received");

        let (url, thresholds) = validate_request(request)?;
        tracing::debug!(stage = %PipelineStage::Validated, url = %url, "Request validated");

        // Anything tracked here is removed if a later stage bails out
        let mut files = TempFiles::new(self.cleaner);

        let input = self.fetcher.fetch(&url).await?;
        files.track(&input);
        tracing::debug!(stage = %PipelineStage::Fetched, path = %input.display(), "Image fetched");

        let output = self.processor.process(&input, thresholds).await?;
        files.track(&output);
        tracing::info!(
            stage = %PipelineStage::Processed,
            "🖼️  Edges detected for {} via {}",
            url,
            self.processor.operation().name()
        );

        Ok(FilteredImage {
            content_type: content_type_for(&output),
            path: output,
            files,
        })
    }
}
