mod common;

use common::*;
use image_filter_service::services::fetcher::FetchError;
use image_filter_service::services::retry::RetryPolicy;
use std::sync::atomic::Ordering;
use std::time::Duration;
use url::Url;

fn no_retry() -> RetryPolicy {
    RetryPolicy::with_max_attempts(1)
}

#[tokio::test]
async fn test_fetches_into_sniffed_extension() {
    let temp = tempfile::tempdir().unwrap();
    let server = spawn_image_server().await;
    let fetcher = test_fetcher(temp.path(), 1024 * 1024, no_retry());

    let path = fetcher
        .fetch(&Url::parse(&server.url("/disguised")).unwrap())
        .await
        .unwrap();

    assert_eq!(path.parent(), Some(temp.path()));
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    assert_eq!(std::fs::read(&path).unwrap(), sample_png());
    assert_eq!(dir_entries(temp.path()), vec![path]);
}

#[tokio::test]
async fn test_http_error_status() {
    let temp = tempfile::tempdir().unwrap();
    let server = spawn_image_server().await;
    let fetcher = test_fetcher(temp.path(), 1024 * 1024, no_retry());

    let err = fetcher
        .fetch(&Url::parse(&server.url("/missing.png")).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status(404)));
    assert!(dir_entries(temp.path()).is_empty());
}

#[tokio::test]
async fn test_non_image_body_leaves_nothing_behind() {
    let temp = tempfile::tempdir().unwrap();
    let server = spawn_image_server().await;
    let fetcher = test_fetcher(temp.path(), 1024 * 1024, no_retry());

    let err = fetcher
        .fetch(&Url::parse(&server.url("/page.html")).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::NotAnImage));
    assert!(dir_entries(temp.path()).is_empty());
}

#[tokio::test]
async fn test_truncated_image_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let server = spawn_image_server().await;
    let fetcher = test_fetcher(temp.path(), 1024 * 1024, no_retry());

    let err = fetcher
        .fetch(&Url::parse(&server.url("/truncated.png")).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::NotAnImage));
    assert!(dir_entries(temp.path()).is_empty());
}

#[tokio::test]
async fn test_oversized_image_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    let server = spawn_image_server().await;
    let fetcher = test_fetcher(temp.path(), 64, no_retry());

    let err = fetcher
        .fetch(&Url::parse(&server.url("/tulips.png")).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::TooLarge { limit: 64 }));
    assert!(dir_entries(temp.path()).is_empty());
}

#[tokio::test]
async fn test_unreachable_host() {
    let temp = tempfile::tempdir().unwrap();
    let fetcher = test_fetcher(temp.path(), 1024 * 1024, no_retry());

    let err = fetcher
        .fetch(&Url::parse(UNREACHABLE_URL).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Connect(_)));
    assert!(dir_entries(temp.path()).is_empty());
}

#[tokio::test]
async fn test_retries_transient_failure() {
    let temp = tempfile::tempdir().unwrap();
    let server = spawn_image_server().await;
    let retry = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
    };
    let fetcher = test_fetcher(temp.path(), 1024 * 1024, retry);

    let path = fetcher
        .fetch(&Url::parse(&server.url("/flaky.png")).unwrap())
        .await
        .unwrap();

    assert_eq!(server.flaky_hits.load(Ordering::SeqCst), 2);
    assert_eq!(dir_entries(temp.path()), vec![path]);
}
