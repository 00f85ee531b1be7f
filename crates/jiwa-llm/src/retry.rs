//! Retry loop shared by the HTTP backends.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::LlmError;

const FIRST_DELAY: Duration = Duration::from_millis(500);
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Statuses worth another attempt: quota pushback and overloaded upstreams.
fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE
    )
}

/// Honour a numeric `Retry-After`, else double [`FIRST_DELAY`] per attempt.
fn delay_for(response: &reqwest::Response, attempt: u32) -> Duration {
    let advertised = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
    advertised.unwrap_or_else(|| exponential(attempt)).min(MAX_DELAY)
}

fn exponential(attempt: u32) -> Duration {
    FIRST_DELAY.saturating_mul(1 << attempt.min(10))
}

/// Run `send` until it yields a non-transient response or `retries` extra
/// attempts are spent.
///
/// A final 429 becomes [`LlmError::RateLimited`]; a final 5xx is handed back so
/// the backend can report its status.
///
/// # Errors
///
/// Transport failures surface as [`LlmError::Http`] without retrying.
pub(crate) async fn send_with_retry<F, Fut>(
    service: &str,
    retries: u32,
    mut send: F,
) -> Result<reqwest::Response, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        let response = send().await?;
        let status = response.status();
        if !is_transient(status) {
            return Ok(response);
        }
        if attempt >= retries {
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimited);
            }
            return Ok(response);
        }

        let delay = delay_for(&response, attempt);
        tracing::warn!(
            service,
            status = status.as_u16(),
            attempt = attempt + 1,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "transient upstream status, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn post_to(server: &MockServer, retries: u32) -> Result<reqwest::Response, LlmError> {
        let client = reqwest::Client::new();
        let url = server.uri();
        send_with_retry("test", retries, || client.post(&url).send()).await
    }

    #[test]
    fn exponential_starts_at_half_a_second() {
        assert_eq!(exponential(0), Duration::from_millis(500));
        assert_eq!(exponential(2), Duration::from_secs(2));
    }

    #[test]
    fn transient_statuses() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient(StatusCode::BAD_REQUEST));
        assert!(!is_transient(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn ok_response_is_returned_immediately() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(post_to(&server, 3).await.unwrap().status(), 200);
    }

    #[tokio::test]
    async fn persistent_429_becomes_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
            .expect(3)
            .mount(&server)
            .await;

        assert!(matches!(post_to(&server, 2).await, Err(LlmError::RateLimited)));
    }

    #[tokio::test]
    async fn persistent_503_is_handed_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).insert_header("retry-after", "0"))
            .expect(2)
            .mount(&server)
            .await;

        assert_eq!(post_to(&server, 1).await.unwrap().status(), 503);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(post_to(&server, 3).await.unwrap().status(), 400);
    }

    proptest! {
        #[test]
        fn delay_grows_and_stays_bounded(attempt in 0u32..40) {
            prop_assert!(exponential(attempt + 1) >= exponential(attempt));
            prop_assert!(exponential(attempt).min(MAX_DELAY) <= MAX_DELAY);
        }
    }
}
