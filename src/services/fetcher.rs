use crate::config::ServiceConfig;
use crate::services::cleaner::{FileCleaner, TempFiles};
use crate::services::retry::{FailureKind, RetryDecision, RetryPolicy};
use crate::utils::temp_path::unique_temp_path;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Bytes kept from the start of the body for type sniffing
const SNIFF_LEN: usize = 512;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("could not connect: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("remote server returned HTTP {0}")]
    Status(u16),

    #[error("image is larger than {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("response body is not image data")]
    NotAnImage,

    #[error("request failed: {0}")]
    Request(String),

    #[error("local write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self {
            FetchError::Timeout => FailureKind::Timeout,
            FetchError::Connect(_) | FetchError::Request(_) => FailureKind::Connection,
            FetchError::Status(status) => FailureKind::from_status(*status),
            FetchError::UnsupportedScheme(_)
            | FetchError::TooLarge { .. }
            | FetchError::NotAnImage
            | FetchError::Io(_) => FailureKind::Permanent,
        }
    }
}

/// Downloads remote images into request-scoped files.
pub struct ImageFetcher {
    client: reqwest::Client,
    temp_dir: PathBuf,
    max_bytes: u64,
    retry: RetryPolicy,
    cleaner: FileCleaner,
}

impl ImageFetcher {
    pub fn new(client: reqwest::Client, temp_dir: PathBuf, max_bytes: u64, retry: RetryPolicy) -> Self {
        Self {
            client,
            temp_dir,
            max_bytes,
            retry,
            cleaner: FileCleaner,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.fetch_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::new(
            client,
            config.temp_dir.clone(),
            config.max_image_size,
            RetryPolicy::with_max_attempts(config.fetch_max_attempts),
        ))
    }

    /// Fetches `url` into a new file and returns its path.
    ///
    /// On error nothing is left on disk.
    pub async fn fetch(&self, url: &Url) -> Result<PathBuf, FetchError> {
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(FetchError::UnsupportedScheme(other.to_string())),
        }

        let mut attempt = 1u32;
        loop {
            match self.fetch_once(url).await {
                Ok(path) => {
                    tracing::info!("📥 Fetched {} into {}", url, path.display());
                    return Ok(path);
                }
                Err(e) => match self.retry.decide(attempt, e.failure_kind()) {
                    RetryDecision::NoRetry => {
                        tracing::warn!("Fetch of {} failed after {} attempt(s): {}", url, attempt, e);
                        return Err(e);
                    }
                    RetryDecision::RetryAfter(delay) => {
                        tracing::warn!(
                            "Fetch attempt {} for {} failed ({}), retrying in {:?}",
                            attempt,
                            url,
                            e,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                },
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<PathBuf, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes)
        {
            return Err(FetchError::TooLarge {
                limit: self.max_bytes,
            });
        }

        // Removed on any early return, including the future being dropped
        let partial = unique_temp_path(&self.temp_dir, "download", "part");
        let mut pending = TempFiles::new(self.cleaner);
        pending.track(&partial);

        let extension = self.write_body(response, &partial).await?;
        let target = partial.with_extension(extension);
        pending.track(&target);
        tokio::fs::rename(&partial, &target).await?;
        ensure_decodes(&target).await?;

        pending.disarm();
        Ok(target)
    }

    /// Streams the body to `path`, returning the sniffed image extension.
    async fn write_body(
        &self,
        mut response: reqwest::Response,
        path: &Path,
    ) -> Result<&'static str, FetchError> {
        let mut file = tokio::fs::File::create(path).await?;
        let mut header = Vec::with_capacity(SNIFF_LEN);
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await.map_err(FetchError::from_reqwest)? {
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(FetchError::TooLarge {
                    limit: self.max_bytes,
                });
            }

            if header.len() < SNIFF_LEN {
                let take = (SNIFF_LEN - header.len()).min(chunk.len());
                header.extend_from_slice(&chunk[..take]);
            }

            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        infer::get(&header)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .map(|kind| kind.extension())
            .filter(|extension| DECODABLE.contains(extension))
            .ok_or(FetchError::NotAnImage)
    }
}

/// Sniffed types the enabled `image` decoders can read.
const DECODABLE: &[&str] = &["jpg", "png", "gif", "webp"];

/// Fully decodes the download so truncated or corrupt bodies fail here.
async fn ensure_decodes(path: &Path) -> Result<(), FetchError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<(), FetchError> {
        image::io::Reader::open(&path)?
            .with_guessed_format()?
            .decode()
            .map(|_| ())
            .map_err(|e| {
                tracing::debug!("Downloaded file {} does not decode: {}", path.display(), e);
                FetchError::NotAnImage
            })
    })
    .await
    .map_err(|e| FetchError::Io(std::io::Error::other(e)))?
}
