//! External OPMET report service.
//! See [Port].

use async_trait::async_trait;
use opmet::{QueryRequest, QueryResponse};

/// Trait used to allow mocking the [opmet] report service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Port: Send + Sync {
    /// Query reports using [opmet::obtain_reports()].
    async fn obtain_reports(&self, request: &QueryRequest) -> Result<QueryResponse, opmet::Error>;
}

/// Concrete implementation of [Port].
pub struct Gateway {
    http_client: reqwest::Client,
    endpoint: url::Url,
}

impl Gateway {
    /// Construct a new [Gateway] which posts queries to `endpoint`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, endpoint: url::Url) -> Self {
        Self {
            http_client,
            endpoint,
        }
    }
}

#[async_trait]
impl Port for Gateway {
    async fn obtain_reports(&self, request: &QueryRequest) -> Result<QueryResponse, opmet::Error> {
        opmet::obtain_reports(&self.http_client, &self.endpoint, request).await
    }
}
