//! Client-side rejection of operations the connected server version does not
//! support, and of requests whose input was found unusable.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{ApiError, GraphQlRequest, RequestExecutor, ServerVersion};
use serde_json::Value;

/// Rejects version-gated operations, then requests marked with invalid input,
/// before they reach the wrapped executor.
pub struct VersionGatedExecutor {
    inner: Arc<dyn RequestExecutor>,
    server_version: Option<ServerVersion>,
}

impl VersionGatedExecutor {
    /// Gates against `server_version`; `None` lets every operation through.
    pub fn new(inner: Arc<dyn RequestExecutor>, server_version: Option<ServerVersion>) -> Self {
        Self {
            inner,
            server_version,
        }
    }
}

#[async_trait]
impl RequestExecutor for VersionGatedExecutor {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value, ApiError> {
        if let Some(gate) = &request.operation.gate {
            if let Err(err) = gate.check(request.operation.name, self.server_version) {
                tracing::warn!(
                    operation = request.operation.name,
                    server_version = %err.server_version,
                    "operation rejected by version gate"
                );
                return Err(err.into());
            }
        }
        if let Some(message) = request.invalid_input {
            return Err(ApiError::InvalidArgument {
                operation: request.operation.name.to_string(),
                message,
            });
        }
        self.inner.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::test_support::StubExecutor;
    use serde_json::json;

    #[tokio::test]
    async fn rejected_operation_never_reaches_the_inner_executor() {
        let stub = Arc::new(StubExecutor::new().respond(json!({ "streamGrantPermission": true })));
        let gated = VersionGatedExecutor::new(stub.clone(), Some(ServerVersion::new(2, 6, 4)));

        let err = gated
            .execute(GraphQlRequest::new(&catalog::STREAM_GRANT_PERMISSION, json!({})))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::UnsupportedOperation(_)));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn ungated_operation_passes_through() {
        let stub = Arc::new(StubExecutor::new().respond(json!({ "streamDelete": true })));
        let gated = VersionGatedExecutor::new(stub.clone(), Some(ServerVersion::Dev));

        let data = gated
            .execute(GraphQlRequest::new(&catalog::STREAM_DELETE, json!({ "id": "s1" })))
            .await
            .unwrap();

        assert_eq!(data, json!({ "streamDelete": true }));
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_after_the_version_check() {
        let stub = Arc::new(StubExecutor::new().respond(json!({ "streamInviteCreate": true })));
        let request = GraphQlRequest::new(&catalog::STREAM_INVITE_CREATE, json!({}))
            .with_invalid_input("provide either an email or a user id");

        let old = VersionGatedExecutor::new(stub.clone(), Some(ServerVersion::new(2, 6, 3)));
        let err = old.execute(request.clone()).await.unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedOperation(_)));

        let current = VersionGatedExecutor::new(stub.clone(), Some(ServerVersion::new(2, 6, 4)));
        let err = current.execute(request).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { .. }));
        assert_eq!(stub.call_count(), 0);
    }
}
