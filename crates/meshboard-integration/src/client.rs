use std::sync::mpsc;
use std::time::Duration;

use reqwest::Client;

use crate::bootstrap;
use crate::error::IntegrationError;
use crate::types::{BootstrapModel, BootstrapReport};

/// A non-blocking handle to an in-flight async request.
/// Call `try_recv()` to poll for the result without blocking the caller.
pub struct PendingRequest<T> {
    receiver: mpsc::Receiver<Result<T, IntegrationError>>,
}

impl<T> PendingRequest<T> {
    /// Non-blocking check for the result. Returns `None` if still pending.
    pub fn try_recv(&self) -> Option<Result<T, IntegrationError>> {
        self.receiver.try_recv().ok()
    }

    /// Blocking wait for the result.
    pub fn wait(self) -> Result<T, IntegrationError> {
        self.receiver
            .recv()
            .map_err(|_| IntegrationError::Network("Channel closed".into()))?
    }

    /// Blocking wait bounded by `timeout`.
    pub fn wait_timeout(self, timeout: Duration) -> Result<T, IntegrationError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(IntegrationError::Timeout),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(IntegrationError::Network("Channel closed".into()))
            }
        }
    }
}

/// Fetches bootstrap models on a background tokio runtime.
pub struct BootstrapClient {
    runtime: tokio::runtime::Runtime,
    client: Client,
    timeout: Duration,
}

impl BootstrapClient {
    /// Create a client whose individual requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, IntegrationError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| IntegrationError::Network(format!("Failed to create runtime: {}", e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IntegrationError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            runtime,
            client,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start fetching `models`. Individual failures are collected in the
    /// report rather than failing the request.
    pub fn fetch(&self, models: Vec<BootstrapModel>) -> PendingRequest<BootstrapReport> {
        let (tx, rx) = mpsc::channel();
        let client = self.client.clone();

        self.runtime.spawn(async move {
            let report = bootstrap::fetch_all(client, models).await;
            let _ = tx.send(Ok(report));
        });

        PendingRequest { receiver: rx }
    }

    /// Fetch and wait. Never fails: anything that goes wrong degrades to a
    /// report with fewer (possibly zero) assets.
    pub fn fetch_blocking(&self, models: Vec<BootstrapModel>) -> BootstrapReport {
        // Requests run concurrently, so one timeout plus slack bounds the wait.
        let bound = self.timeout + Duration::from_secs(2);
        match self.fetch(models).wait_timeout(bound) {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!("Bootstrap fetch abandoned: {}", err);
                BootstrapReport::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_request_try_recv_none_then_result() {
        let (tx, rx) = mpsc::channel();
        let pending: PendingRequest<String> = PendingRequest { receiver: rx };

        assert!(pending.try_recv().is_none());

        tx.send(Ok("hello".to_string())).unwrap();

        let result = pending.try_recv();
        assert!(result.is_some());
        assert_eq!(result.unwrap().unwrap(), "hello");
    }

    #[test]
    fn test_pending_request_wait_timeout() {
        let (_tx, rx) = mpsc::channel::<Result<u32, IntegrationError>>();
        let pending = PendingRequest { receiver: rx };
        assert!(matches!(
            pending.wait_timeout(Duration::from_millis(10)),
            Err(IntegrationError::Timeout)
        ));
    }

    #[test]
    fn test_pending_request_disconnected() {
        let (tx, rx) = mpsc::channel::<Result<u32, IntegrationError>>();
        drop(tx);
        let pending = PendingRequest { receiver: rx };
        assert!(matches!(pending.wait(), Err(IntegrationError::Network(_))));
    }

    #[test]
    fn test_error_display() {
        assert!(IntegrationError::Offline.to_string().contains("offline"));
        assert!(IntegrationError::Timeout.to_string().contains("timed out"));
        let status = IntegrationError::HttpStatus {
            status: 404,
            url: "https://example.invalid/x.stl".into(),
        };
        assert!(status.to_string().contains("404"));
    }

    #[test]
    fn test_unreachable_models_degrade_to_empty_report() {
        let client = BootstrapClient::new(Duration::from_secs(2)).unwrap();
        let models = vec![
            BootstrapModel {
                name: "refused.stl".into(),
                url: "http://127.0.0.1:9/refused.stl".into(),
            },
            BootstrapModel {
                name: "bogus.stl".into(),
                url: "not a url".into(),
            },
        ];
        let report = client.fetch_blocking(models);
        assert!(report.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].0, "refused.stl");
    }
}
