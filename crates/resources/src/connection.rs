//! The connection handle passed to every resource client.

use std::sync::Arc;

use domain::{
    Account, ApiError, GraphQlRequest, Operation, RequestExecutor, ServerVersion, SessionId,
    UsageTracker,
};
use serde::de::DeserializeOwned;

use crate::executor::{CachingExecutor, FetchPolicy, TrackingExecutor, VersionGatedExecutor};

/// An authenticated connection to one server.
///
/// Holds the account, the server version reported at authentication time,
/// and the decorated executor stack. Cloning is cheap and every clone shares
/// the same stack. Nothing in it changes after construction.
#[derive(Clone)]
pub struct Connection {
    account: Account,
    server_version: Option<ServerVersion>,
    session: SessionId,
    executor: Arc<dyn RequestExecutor>,
}

impl Connection {
    /// Wraps `base` in the tracking, version-gate, and (per `policy`) cache
    /// decorators.
    pub fn new(
        base: Arc<dyn RequestExecutor>,
        account: Account,
        server_version: Option<ServerVersion>,
        tracker: Arc<dyn UsageTracker>,
        policy: FetchPolicy,
    ) -> Self {
        let session = SessionId::new_random();

        let fetched: Arc<dyn RequestExecutor> = match policy {
            FetchPolicy::AlwaysFresh => base,
            FetchPolicy::ReuseWithinRun => Arc::new(CachingExecutor::new(base)),
        };
        let gated = Arc::new(VersionGatedExecutor::new(fetched, server_version));
        let tracked = Arc::new(TrackingExecutor::new(
            gated,
            tracker,
            account.clone(),
            session,
        ));

        tracing::debug!(
            server = %account.server_url,
            server_version = ?server_version,
            ?policy,
            %session,
            "connection ready"
        );

        Self {
            account,
            server_version,
            session,
            executor: tracked,
        }
    }

    /// The account this connection authenticated with.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The version the server reported, if it could be parsed.
    pub fn server_version(&self) -> Option<ServerVersion> {
        self.server_version
    }

    /// Identifies this connection in usage events.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Sends `request` through the executor stack and decodes `data` as `T`,
    /// the operation's typed response envelope.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: GraphQlRequest,
    ) -> Result<T, ApiError> {
        let operation = request.operation;
        let data = self.executor.execute(request).await?;
        decode(operation, data)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("account", &self.account)
            .field("server_version", &self.server_version)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

pub(crate) fn decode<T: DeserializeOwned>(
    operation: &Operation,
    data: serde_json::Value,
) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|source| ApiError::Decode {
        operation: operation.name.to_string(),
        source,
    })
}

/// The error for a `null` or absent payload at the operation's declared path.
pub(crate) fn missing(operation: &Operation) -> ApiError {
    ApiError::MissingData {
        operation: operation.name.to_string(),
        path: operation.path_display(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::test_support::{sample_account, RecordingTracker, StubExecutor};
    use serde_json::json;

    #[tokio::test]
    async fn stack_tracks_then_gates() {
        let stub = Arc::new(StubExecutor::new().respond(json!({})));
        let tracker = Arc::new(RecordingTracker::default());
        let conn = Connection::new(
            stub.clone(),
            sample_account(),
            Some(ServerVersion::new(2, 7, 0)),
            tracker.clone(),
            FetchPolicy::AlwaysFresh,
        );

        let result: Result<serde_json::Value, _> = conn
            .send(GraphQlRequest::new(&catalog::STREAM_GRANT_PERMISSION, json!({})))
            .await;

        assert!(matches!(result, Err(ApiError::UnsupportedOperation(_))));
        assert_eq!(stub.call_count(), 0);
        assert_eq!(tracker.events().len(), 1);
        assert_eq!(tracker.events()[0].session, conn.session());
    }

    #[tokio::test]
    async fn reuse_policy_installs_the_cache() {
        let stub = Arc::new(StubExecutor::new().respond(json!({ "serverInfo": {} })));
        let conn = Connection::new(
            stub.clone(),
            sample_account(),
            None,
            Arc::new(RecordingTracker::default()),
            FetchPolicy::ReuseWithinRun,
        );

        for _ in 0..3 {
            let _: serde_json::Value = conn
                .send(GraphQlRequest::new(&catalog::SERVER_INFO, json!({})))
                .await
                .unwrap();
        }

        assert_eq!(stub.call_count(), 1);
    }

    #[test]
    fn debug_output_hides_the_token() {
        let conn = Connection::new(
            Arc::new(StubExecutor::new()),
            sample_account(),
            None,
            Arc::new(RecordingTracker::default()),
            FetchPolicy::AlwaysFresh,
        );
        let rendered = format!("{conn:?}");
        assert!(!rendered.contains("token-123"));
    }
}
