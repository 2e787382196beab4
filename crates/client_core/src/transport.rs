use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{submit_order_route, ErrorBody, OrderRequest};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// How the backend answered a delivered order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Any 2xx status. The body is not read.
    Accepted,
    Rejected {
        status: u16,
        message: Option<String>,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid order endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("order request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("order transport unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait OrderTransport: Send + Sync {
    async fn submit_order(&self, order: &OrderRequest) -> Result<SubmitOutcome, TransportError>;
}

pub struct MissingOrderTransport;

#[async_trait]
impl OrderTransport for MissingOrderTransport {
    async fn submit_order(&self, _order: &OrderRequest) -> Result<SubmitOutcome, TransportError> {
        Err(TransportError::Unavailable(
            "no order endpoint configured".into(),
        ))
    }
}

/// Posts orders as JSON to `<base>/api/submit-order`.
pub struct HttpOrderTransport {
    http: Client,
    endpoint: Url,
}

impl HttpOrderTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, TransportError> {
        let endpoint = Url::parse(base_url)?.join(submit_order_route())?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl OrderTransport for HttpOrderTransport {
    async fn submit_order(&self, order: &OrderRequest) -> Result<SubmitOutcome, TransportError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(order)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(SubmitOutcome::Accepted);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(error) => {
                debug!(status = status.as_u16(), %error, "order rejection body is not json");
                None
            }
        };
        Ok(SubmitOutcome::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
