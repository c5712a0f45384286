//! Per-call deadlines for remote operations
//!
//! Remote calls are never retried automatically; the whole pipeline is
//! safe to rerun instead. What each call does get is a deadline, so a
//! stalled connection surfaces as a typed timeout naming the stage it
//! interrupted.

use std::future::Future;
use std::time::Duration;

use crate::core::error::PublishError;

/// Run a remote operation under a deadline
///
/// # Arguments
///
/// * `deadline` - Maximum time the operation may take
/// * `stage` - Short present-progressive label, e.g. "creating commit";
///   it ends up in the timeout message
/// * `operation` - The future performing the remote call
pub async fn with_deadline<T, Fut>(
    deadline: Duration,
    stage: &str,
    operation: Fut,
) -> Result<T, PublishError>
where
    Fut: Future<Output = Result<T, PublishError>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => Err(PublishError::Timeout {
            stage: stage.to_string(),
            seconds: deadline.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fast_operation_passes_through() {
        let result = with_deadline(Duration::from_secs(1), "noop", async {
            Ok::<_, PublishError>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_operation_error_passes_through() {
        let result: Result<(), _> = with_deadline(Duration::from_secs(1), "noop", async {
            Err(PublishError::Network {
                message: "connection reset".to_string(),
            })
        })
        .await;

        assert_eq!(result.unwrap_err().code(), "NETWORK");
    }

    #[tokio::test]
    async fn test_slow_operation_times_out() {
        let result: Result<(), _> =
            with_deadline(Duration::from_millis(20), "uploading blob", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.code(), "TIMEOUT");
        assert!(error.to_string().contains("uploading blob"));
    }
}
