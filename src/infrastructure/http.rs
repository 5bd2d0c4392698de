use futures::future::{AbortRegistration, Abortable};
use gloo_net::http::Request;
use serde_json::Value;

use crate::domain::errors::{CoordinatorError, TransportResult};
use crate::domain::logging::{LogComponent, get_logger};

/// Cancellable request primitive consumed by the coordinator. Payloads are
/// opaque JSON passed through unchanged in both directions.
#[allow(async_fn_in_trait)]
pub trait AnalysisTransport {
    async fn issue(
        &self,
        endpoint: &str,
        payload: &Value,
        abort: AbortRegistration,
    ) -> TransportResult<Value>;
}

/// HTTP transport against the remote analysis service. Aborting the returned
/// future only discards the result locally; remote-side work may continue.
pub struct AnalysisHttpClient {
    base_url: String,
}

impl AnalysisHttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

impl AnalysisTransport for AnalysisHttpClient {
    async fn issue(
        &self,
        endpoint: &str,
        payload: &Value,
        abort: AbortRegistration,
    ) -> TransportResult<Value> {
        let url = self.url_for(endpoint);
        let request = Request::post(&url)
            .json(payload)
            .map_err(|e| CoordinatorError::Transport(e.to_string()))?;

        let exchange = async move {
            let response = request
                .send()
                .await
                .map_err(|e| CoordinatorError::Transport(e.to_string()))?;
            if !response.ok() {
                return Err(CoordinatorError::Transport(format!(
                    "HTTP {} from {}",
                    response.status(),
                    url
                )));
            }
            response
                .json::<Value>()
                .await
                .map_err(|e| CoordinatorError::Transport(e.to_string()))
        };

        match Abortable::new(exchange, abort).await {
            Ok(settled) => settled,
            Err(_aborted) => {
                get_logger().debug(
                    LogComponent::Infrastructure("HttpClient"),
                    &format!("request to {} aborted before settlement", endpoint),
                );
                Err(CoordinatorError::Cancelled)
            }
        }
    }
}
