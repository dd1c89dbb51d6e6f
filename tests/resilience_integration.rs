//! Integration tests for the document store resilience layer
//!
//! Covers configuration presets, the retry policy against flaky operations and
//! the HTTP store's behavior when the server cannot be reached.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use survey_studio::api::{
    DocumentStore, HttpDocumentStore, ResilienceConfig, RetryConfig, RetryPolicy, RetryableError,
    StoreError,
};
use survey_studio::config::Config;

fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

/// Test that ResilienceConfig can be built with all components
#[tokio::test]
async fn test_resilience_config_integration() {
    let config = ResilienceConfig::builder()
        .max_retries(4)
        .request_timeout(Duration::from_secs(12))
        .connect_timeout(Duration::from_secs(3))
        .build();

    assert_eq!(config.retry.max_attempts, 4);
    assert_eq!(config.request_timeout, Duration::from_secs(12));
    assert_eq!(config.connect_timeout, Duration::from_secs(3));
}

/// Test different resilience presets work correctly
#[tokio::test]
async fn test_resilience_presets() {
    let default_config = ResilienceConfig::default();
    assert_eq!(default_config.retry.max_attempts, 3);
    assert_eq!(default_config.request_timeout, Duration::from_secs(30));

    let conservative_config = ResilienceConfig::conservative();
    assert_eq!(conservative_config.retry.max_attempts, 2);

    let dev_config = ResilienceConfig::development();
    assert_eq!(dev_config.retry.max_attempts, 5);

    let disabled_config = ResilienceConfig::disabled();
    assert_eq!(disabled_config.retry.max_attempts, 1);
    assert!(!disabled_config.retry.jitter);
}

/// The config file's retry table drives the store client
#[test]
fn test_config_file_feeds_resilience() {
    let config: Config = toml::from_str(
        r#"
        [store]
        request_timeout_secs = 7

        [retry]
        max_attempts = 6
        base_delay_ms = 50
        max_delay_ms = 400
        backoff_multiplier = 3.0
        jitter = false
        "#,
    )
    .unwrap();

    let resilience = config.resilience();
    assert_eq!(resilience.retry.max_attempts, 6);
    assert_eq!(resilience.retry.max_delay, Duration::from_millis(400));
    assert_eq!(resilience.request_timeout, Duration::from_secs(7));
}

#[tokio::test]
async fn test_retry_recovers_from_transient_failures() {
    let policy = RetryPolicy::new(fast_retry(3));
    let calls = Arc::new(AtomicU32::new(0));

    let counter = calls.clone();
    let result = policy
        .execute(|| {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StoreError::Rejected {
                        status: Some(503),
                        message: "busy".to_string(),
                    })
                } else {
                    Ok("stored")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "stored");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_gives_up_on_client_errors() {
    let policy = RetryPolicy::new(fast_retry(5));
    let calls = Arc::new(AtomicU32::new(0));

    let counter = calls.clone();
    let result: Result<(), StoreError> = policy
        .execute(|| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::NotFound("p1".to_string()))
            }
        })
        .await;

    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!RetryableError::from_store_error(&StoreError::NotFound("p1".to_string())).should_retry());
    assert!(RetryableError::from_store_error(&StoreError::Timeout).should_retry());
}

/// Nothing listens on the discard port, so every call is unreachable
#[tokio::test]
async fn test_unreachable_store_reports_unavailable() {
    let resilience = ResilienceConfig::builder()
        .retry_config(fast_retry(2))
        .request_timeout(Duration::from_secs(2))
        .connect_timeout(Duration::from_secs(1))
        .build();
    let store = HttpDocumentStore::new("http://127.0.0.1:9/api", &resilience).unwrap();

    let err = store.fetch("p1").await.unwrap_err();
    assert!(err.is_unavailable(), "unexpected error: {}", err);
}
