//! Error types for the stream activity domain.
//!
//! [`ApiError`] is what every resource client operation returns. It wraps
//! the two conditions callers must distinguish:
//!
//! - [`ServiceError`]: the server (or the way to it) failed. Propagated
//!   unchanged in meaning; nothing in the client retries.
//! - [`UnsupportedOperationError`]: raised locally, before any request is
//!   sent, when a version-gated operation is called against an incompatible
//!   server.
//!
//! [`TrackingError`] is produced by usage trackers and never reaches a caller
//! of a resource operation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ServerVersion;

// ---------------------------------------------------------------------------
// Remote failures
// ---------------------------------------------------------------------------

/// A failure reported by the server or by the transport in front of it.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum ServiceError {
    /// The GraphQL response carried one or more entries in `errors`.
    ///
    /// Covers server-side validation, permission and not-found failures.
    #[error("`{operation}` failed: {}", .messages.join("; "))]
    GraphQl {
        /// Catalog name of the operation that failed.
        operation: String,
        /// Every `errors[].message` reported by the server, in order.
        messages: Vec<String>,
    },

    /// The server rejected the token (HTTP 401 or 403).
    #[error("`{operation}` was not authorised (HTTP {status}); check the token")]
    Unauthorized {
        /// Catalog name of the operation that failed.
        operation: String,
        /// The HTTP status returned.
        status: u16,
    },

    /// The server answered with a non-success HTTP status and no GraphQL errors.
    #[error("`{operation}` failed with HTTP {status}")]
    Http {
        /// Catalog name of the operation that failed.
        operation: String,
        /// The HTTP status returned.
        status: u16,
    },

    /// The request never completed: connection failure, timeout, or body read error.
    #[error("`{operation}` could not reach the server: {message}")]
    Transport {
        /// Catalog name of the operation that failed.
        operation: String,
        /// Transport-level description of the failure.
        message: String,
    },

    /// The response body was not a GraphQL envelope.
    #[error("`{operation}` returned a malformed response: {message}")]
    InvalidResponse {
        /// Catalog name of the operation that failed.
        operation: String,
        /// Description of what could not be read.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Local rejections
// ---------------------------------------------------------------------------

/// A version-gated operation was called against a server that does not
/// support it. No request was sent.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("`{operation}` is not supported by server version {server_version}. {guidance}")]
pub struct UnsupportedOperationError {
    /// Catalog name of the rejected operation.
    pub operation: String,
    /// The version the connected server reported.
    pub server_version: ServerVersion,
    /// What to use instead.
    pub guidance: String,
}

/// A usage-tracking side call failed.
///
/// Always swallowed by the tracking layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("usage tracking failed: {0}")]
pub struct TrackingError(pub String);

// ---------------------------------------------------------------------------
// Resource-level error
// ---------------------------------------------------------------------------

/// The error returned by every resource client operation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server or transport failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The operation was rejected locally by its version gate.
    #[error(transparent)]
    UnsupportedOperation(#[from] UnsupportedOperationError),

    /// A required input was absent.
    ///
    /// Only presence is checked locally; legality is decided by the server.
    #[error("invalid arguments for `{operation}`: {message}")]
    InvalidArgument {
        /// Catalog name of the operation.
        operation: String,
        /// Which input was missing.
        message: String,
    },

    /// The response had no value at the operation's declared path.
    #[error("`{operation}` returned no data at `{path}`")]
    MissingData {
        /// Catalog name of the operation.
        operation: String,
        /// The declared response path, dot-separated.
        path: String,
    },

    /// The value at the declared path did not match the expected shape.
    #[error("`{operation}` returned data that could not be decoded: {source}")]
    Decode {
        /// Catalog name of the operation.
        operation: String,
        /// The underlying deserialisation failure.
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Returns `true` if the error was raised locally without contacting the server.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOperation(_) | Self::InvalidArgument { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graphql_errors_join_all_messages() {
        let err = ServiceError::GraphQl {
            operation: "Stream".into(),
            messages: vec!["first".into(), "second".into()],
        };
        assert_eq!(err.to_string(), "`Stream` failed: first; second");
    }

    #[test]
    fn unsupported_operation_carries_guidance() {
        let err = ApiError::from(UnsupportedOperationError {
            operation: "StreamGrantPermission".into(),
            server_version: ServerVersion::new(2, 7, 0),
            guidance: "Use `update_permission`.".into(),
        });
        assert!(err.is_local());
        assert_eq!(
            err.to_string(),
            "`StreamGrantPermission` is not supported by server version 2.7.0. Use `update_permission`."
        );
    }

    #[test]
    fn service_errors_are_not_local() {
        let err = ApiError::from(ServiceError::Http {
            operation: "Stream".into(),
            status: 502,
        });
        assert!(!err.is_local());
    }
}
