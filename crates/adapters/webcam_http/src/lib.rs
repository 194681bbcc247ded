//! # gopro-adapter-webcam-http
//!
//! Webcam control adapter speaking the camera's HTTP webcam bridge.
//!
//! ## Responsibilities
//! - Implement the `WebcamControl` port from `gopro-app`
//! - Issue `GET http://{address}/gp/gpWebcam/START` and `.../STOP`
//! - Retry transient failures with bounded exponential backoff
//!
//! ## Dependency rule
//! Depends on `gopro-app` (for the port trait). Never imported by domain or app.

pub mod config;
pub mod error;
pub mod retry;

use std::time::Duration;

use gopro_app::ports::{ControlError, WebcamControl, WebcamOperation};

use crate::config::WebcamHttpConfig;
use crate::error::WebcamHttpError;
use crate::retry::RetryPolicy;

/// Path prefix of the camera's webcam bridge.
pub const WEBCAM_PATH: &str = "/gp/gpWebcam";

/// [`WebcamControl`] over plain HTTP.
///
/// Keeps no per-camera state. Every call is an independent request
/// sequence bounded by the configured [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct HttpWebcamController {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpWebcamController {
    /// Build a controller from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WebcamHttpError::InvalidRetryPolicy`] for an inconsistent
    /// retry section, or [`WebcamHttpError::Client`] if the HTTP client
    /// cannot be constructed.
    pub fn new(config: &WebcamHttpConfig) -> Result<Self, WebcamHttpError> {
        let retry = RetryPolicy::try_from(&config.retry)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.request_timeout_secs)))
            .connect_timeout(Duration::from_secs(u64::from(config.connect_timeout_secs)))
            .build()
            .map_err(WebcamHttpError::Client)?;
        Ok(Self { client, retry })
    }

    /// Build a controller around an existing client and policy.
    #[must_use]
    pub fn with_client(client: reqwest::Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    fn endpoint(
        &self,
        operation: WebcamOperation,
        address: &str,
    ) -> Result<reqwest::Url, WebcamHttpError> {
        if address.trim().is_empty() {
            return Err(WebcamHttpError::InvalidAddress {
                address: address.to_string(),
                source: None,
            });
        }
        let command = match operation {
            WebcamOperation::Start => "START",
            WebcamOperation::Stop => "STOP",
        };
        self.client
            .get(format!("http://{address}{WEBCAM_PATH}/{command}"))
            .build()
            .map(|request| request.url().clone())
            .map_err(|source| WebcamHttpError::InvalidAddress {
                address: address.to_string(),
                source: Some(source),
            })
    }

    async fn send_once(&self, url: reqwest::Url) -> Result<(), WebcamHttpError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(WebcamHttpError::Status(status))
        }
    }

    #[tracing::instrument(skip(self), fields(max_attempts = self.retry.max_attempts()))]
    async fn call(&self, operation: WebcamOperation, address: &str) -> Result<(), ControlError> {
        let url = match self.endpoint(operation, address) {
            Ok(url) => url,
            Err(err) => {
                tracing::error!(error = %err, "refusing to contact camera");
                return Err(ControlError::new(operation, address, 0, err));
            }
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(url.clone()).await {
                Ok(()) => {
                    tracing::info!(attempt, "webcam command accepted");
                    return Ok(());
                }
                Err(err) if err.is_transient() && attempt < self.retry.max_attempts() => {
                    let delay = self.retry.backoff(attempt);
                    tracing::warn!(
                        error = %err,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "transient webcam failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::error!(error = %err, attempt, "webcam command failed");
                    return Err(ControlError::new(operation, address, attempt, err));
                }
            }
        }
    }
}

impl WebcamControl for HttpWebcamController {
    async fn start(&self, address: &str) -> Result<(), ControlError> {
        self.call(WebcamOperation::Start, address).await
    }

    async fn stop(&self, address: &str) -> Result<(), ControlError> {
        self.call(WebcamOperation::Stop, address).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::State;
    use axum::http::{StatusCode, Uri};

    use super::*;

    /// Fake camera answering with scripted statuses, then `200 OK`.
    #[derive(Default)]
    struct FakeCamera {
        script: Mutex<VecDeque<StatusCode>>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeCamera {
        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn answer(State(camera): State<Arc<FakeCamera>>, uri: Uri) -> StatusCode {
        camera.requests.lock().unwrap().push(uri.path().to_string());
        camera
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StatusCode::OK)
    }

    async fn spawn_camera(script: Vec<StatusCode>) -> (String, Arc<FakeCamera>) {
        let camera = Arc::new(FakeCamera {
            script: Mutex::new(script.into()),
            requests: Mutex::default(),
        });
        let app = Router::new()
            .fallback(answer)
            .with_state(Arc::clone(&camera));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (address, camera)
    }

    /// Camera that accepts the connection but answers too late.
    async fn spawn_slow_camera(delay: Duration) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let app = Router::new().fallback(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                StatusCode::OK
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (address, hits)
    }

    fn controller(max_attempts: u32) -> HttpWebcamController {
        controller_with_timeout(max_attempts, Duration::from_secs(2))
    }

    fn controller_with_timeout(max_attempts: u32, timeout: Duration) -> HttpWebcamController {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap();
        let retry = RetryPolicy::new(
            max_attempts,
            Duration::from_millis(1),
            Duration::from_millis(5),
            2.0,
        )
        .unwrap();
        HttpWebcamController::with_client(client, retry)
    }

    fn http_source(err: &ControlError) -> &WebcamHttpError {
        err.source.downcast_ref::<WebcamHttpError>().unwrap()
    }

    #[tokio::test]
    async fn should_request_start_path_when_starting() {
        let (address, camera) = spawn_camera(Vec::new()).await;

        controller(3).start(&address).await.unwrap();

        assert_eq!(camera.requests(), vec!["/gp/gpWebcam/START"]);
    }

    #[tokio::test]
    async fn should_request_stop_path_when_stopping() {
        let (address, camera) = spawn_camera(Vec::new()).await;

        controller(3).stop(&address).await.unwrap();

        assert_eq!(camera.requests(), vec!["/gp/gpWebcam/STOP"]);
    }

    #[tokio::test]
    async fn should_succeed_when_transient_failures_clear_before_limit() {
        let (address, camera) = spawn_camera(vec![
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::SERVICE_UNAVAILABLE,
        ])
        .await;

        controller(5).start(&address).await.unwrap();

        assert_eq!(camera.requests().len(), 3);
    }

    #[tokio::test]
    async fn should_stop_after_max_attempts_when_camera_keeps_failing() {
        let (address, camera) = spawn_camera(vec![StatusCode::INTERNAL_SERVER_ERROR; 10]).await;

        let err = controller(3).start(&address).await.unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(err.operation, WebcamOperation::Start);
        assert_eq!(err.address, address);
        assert!(matches!(
            http_source(&err),
            WebcamHttpError::Status(StatusCode::INTERNAL_SERVER_ERROR)
        ));
        assert_eq!(camera.requests().len(), 3);
    }

    #[tokio::test]
    async fn should_not_retry_when_camera_rejects_request() {
        let (address, camera) = spawn_camera(vec![StatusCode::NOT_FOUND]).await;

        let err = controller(5).stop(&address).await.unwrap_err();

        assert_eq!(err.attempts, 1);
        assert!(matches!(
            http_source(&err),
            WebcamHttpError::Status(StatusCode::NOT_FOUND)
        ));
        assert_eq!(camera.requests().len(), 1);
    }

    #[tokio::test]
    async fn should_retry_when_connection_is_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = controller(3).start(&address).await.unwrap_err();

        assert_eq!(err.attempts, 3);
        assert!(matches!(http_source(&err), WebcamHttpError::Request(_)));
    }

    #[tokio::test]
    async fn should_retry_until_limit_when_camera_answers_too_slowly() {
        let (address, hits) = spawn_slow_camera(Duration::from_secs(2)).await;

        let err = controller_with_timeout(3, Duration::from_millis(100))
            .start(&address)
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert!(matches!(
            http_source(&err),
            WebcamHttpError::Request(source) if source.is_timeout()
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn should_send_nothing_when_address_is_malformed() {
        let err = controller(5).start("not a host").await.unwrap_err();

        assert_eq!(err.attempts, 0);
        assert!(matches!(
            http_source(&err),
            WebcamHttpError::InvalidAddress { .. }
        ));
    }

    #[test]
    fn should_accept_bracketed_ipv6_host() {
        let url = controller(1)
            .endpoint(WebcamOperation::Start, "[::1]")
            .unwrap();

        assert_eq!(url.as_str(), "http://[::1]/gp/gpWebcam/START");
    }

    #[tokio::test]
    async fn should_send_nothing_when_address_is_empty() {
        let err = controller(5).stop("").await.unwrap_err();

        assert_eq!(err.attempts, 0);
        assert_eq!(err.operation, WebcamOperation::Stop);
    }

    #[test]
    fn should_reject_invalid_retry_config() {
        let mut config = WebcamHttpConfig::default();
        config.retry.max_attempts = 0;

        let result = HttpWebcamController::new(&config);

        assert!(matches!(result, Err(WebcamHttpError::InvalidRetryPolicy(_))));
    }

    #[test]
    fn should_build_from_default_config() {
        assert!(HttpWebcamController::new(&WebcamHttpConfig::default()).is_ok());
    }
}
