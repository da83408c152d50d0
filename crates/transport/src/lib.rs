//! GraphQL-over-HTTP transport for the stream activity client.
//!
//! Implements the [`domain::RequestExecutor`] trait with `reqwest`. Every
//! request is a single `POST <server>/graphql` carrying
//! `{query, variables, operationName}` and a bearer token.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, status handling, and envelope parsing
//! live here. The `resources` crate sees only [`domain::RequestExecutor`].
//!
//! ## Failure mapping
//!
//! | Condition | Error |
//! |-----------|-------|
//! | HTTP 401 / 403 | [`ServiceError::Unauthorized`] |
//! | non-empty `errors` array | [`ServiceError::GraphQl`] |
//! | other non-2xx status | [`ServiceError::Http`] |
//! | connect / timeout / body read failure | [`ServiceError::Transport`] |
//! | body is not a GraphQL envelope, or `data` is absent | [`ServiceError::InvalidResponse`] |
//!
//! Nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use domain::{Account, ApiError, AuthToken, GraphQlRequest, RequestExecutor, ServiceError};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while constructing an [`HttpExecutor`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build the HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for [`HttpExecutor`].
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Upper bound for one request, connect through body.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("stream-activity/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Sends catalog operations to one server with one token.
pub struct HttpExecutor {
    http: reqwest::Client,
    endpoint: String,
    token: AuthToken,
}

impl HttpExecutor {
    /// Builds the HTTP client for `account`'s GraphQL endpoint.
    pub fn new(account: &Account, options: &HttpOptions) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            endpoint: account.server_url.graphql_endpoint(),
            token: account.token.clone(),
        })
    }

    /// The GraphQL URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value, ApiError> {
        let operation = request.operation.name;
        tracing::debug!(operation, endpoint = %self.endpoint, "sending GraphQL request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.token.expose())
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| transport_failure(operation, &e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ServiceError::Unauthorized {
                operation: operation.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport_failure(operation, &e))?;

        let result = interpret(operation, status.as_u16(), &body);
        if let Err(err) = &result {
            tracing::debug!(
                operation,
                status = status.as_u16(),
                error = %err,
                "GraphQL request failed"
            );
        }
        result.map_err(ApiError::from)
    }
}

fn transport_failure(operation: &str, err: &reqwest::Error) -> ServiceError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else {
        err.to_string()
    };
    ServiceError::Transport {
        operation: operation.to_string(),
        message,
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<ErrorEntry>>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    message: String,
}

/// Maps an HTTP status and body to the envelope's `data` or a [`ServiceError`].
fn interpret(operation: &str, status: u16, body: &str) -> Result<Value, ServiceError> {
    let success = (200..300).contains(&status);

    let envelope: Envelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !success => {
            return Err(ServiceError::Http {
                operation: operation.to_string(),
                status,
            })
        }
        Err(e) => {
            return Err(ServiceError::InvalidResponse {
                operation: operation.to_string(),
                message: e.to_string(),
            })
        }
    };

    if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
        return Err(ServiceError::GraphQl {
            operation: operation.to_string(),
            messages: errors.into_iter().map(|e| e.message).collect(),
        });
    }

    if !success {
        return Err(ServiceError::Http {
            operation: operation.to_string(),
            status,
        });
    }

    match envelope.data {
        Some(Value::Null) | None => Err(ServiceError::InvalidResponse {
            operation: operation.to_string(),
            message: "response has no data".to_string(),
        }),
        Some(data) => Ok(data),
    }
}
