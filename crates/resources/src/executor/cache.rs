//! Per-run memoisation of query responses, enabled by
//! [`FetchPolicy::ReuseWithinRun`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use domain::{ApiError, GraphQlRequest, OperationKind, RequestExecutor};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether query results may be reused within one process run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchPolicy {
    /// Every call goes to the server.
    #[default]
    AlwaysFresh,
    /// Identical queries are answered from memory until the next mutation.
    ReuseWithinRun,
}

/// Memoises query responses by operation name and variables.
///
/// Mutations always reach the server and clear every stored response. Errors
/// are never stored.
pub struct CachingExecutor {
    inner: Arc<dyn RequestExecutor>,
    entries: Mutex<HashMap<String, Value>>,
}

impl CachingExecutor {
    /// Wraps `inner` with an empty store.
    pub fn new(inner: Arc<dyn RequestExecutor>) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn key(request: &GraphQlRequest) -> String {
        format!(
            "{}:{}",
            request.operation.name,
            Value::Object(request.variables.clone())
        )
    }

    fn lookup(&self, key: &str) -> Option<Value> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(key).cloned(),
        }
    }

    fn store(&self, key: String, value: Value) {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key, value);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(key, value);
            }
        }
    }

    fn clear(&self) {
        match self.entries.lock() {
            Ok(mut entries) => entries.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

#[async_trait]
impl RequestExecutor for CachingExecutor {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value, ApiError> {
        if request.operation.kind == OperationKind::Mutation {
            self.clear();
            return self.inner.execute(request).await;
        }

        let key = Self::key(&request);
        if let Some(hit) = self.lookup(&key) {
            tracing::debug!(operation = request.operation.name, "served from run cache");
            return Ok(hit);
        }

        let value = self.inner.execute(request).await?;
        self.store(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::test_support::StubExecutor;
    use serde_json::json;

    fn stream_request(id: &str) -> GraphQlRequest {
        GraphQlRequest::new(
            &catalog::STREAM_GET,
            json!({ "id": id, "branch_limit": 10, "commit_limit": 10 }),
        )
    }

    #[tokio::test]
    async fn identical_queries_hit_the_server_once() {
        let stub = Arc::new(
            StubExecutor::new().respond(json!({ "stream": { "id": "s1", "name": "A" } })),
        );
        let cache = CachingExecutor::new(stub.clone());

        let first = cache.execute(stream_request("s1")).await.unwrap();
        let second = cache.execute(stream_request("s1")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn different_variables_are_separate_entries() {
        let stub = Arc::new(
            StubExecutor::new().respond(json!({ "stream": { "id": "s1", "name": "A" } })),
        );
        let cache = CachingExecutor::new(stub.clone());

        cache.execute(stream_request("s1")).await.unwrap();
        cache.execute(stream_request("s2")).await.unwrap();

        assert_eq!(stub.call_count(), 2);
    }

    #[tokio::test]
    async fn mutations_bypass_and_invalidate() {
        let stub = Arc::new(
            StubExecutor::new().respond(json!({ "stream": { "id": "s1", "name": "A" } })),
        );
        let cache = CachingExecutor::new(stub.clone());

        cache.execute(stream_request("s1")).await.unwrap();
        cache
            .execute(GraphQlRequest::new(&catalog::STREAM_DELETE, json!({ "id": "s1" })))
            .await
            .unwrap();
        cache.execute(stream_request("s1")).await.unwrap();

        assert_eq!(stub.call_count(), 3);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let stub = Arc::new(StubExecutor::new().fail_with_graphql("boom"));
        let cache = CachingExecutor::new(stub.clone());

        assert!(cache.execute(stream_request("s1")).await.is_err());
        assert!(cache.execute(stream_request("s1")).await.is_err());
        assert_eq!(stub.call_count(), 2);
    }

    #[test]
    fn default_policy_is_always_fresh() {
        assert_eq!(FetchPolicy::default(), FetchPolicy::AlwaysFresh);
    }
}
