//! Branch resource.

use domain::{ApiError, Branch, GraphQlRequest, StreamId};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::catalog;
use crate::connection::{missing, Connection};

#[derive(Deserialize)]
struct BranchListData {
    stream: Option<StreamBranches>,
}

#[derive(Deserialize)]
struct StreamBranches {
    branches: Option<BranchItems>,
}

#[derive(Deserialize)]
struct BranchItems {
    items: Option<Vec<Branch>>,
}

#[derive(Deserialize)]
struct BranchGetData {
    stream: Option<StreamBranch>,
}

#[derive(Deserialize)]
struct StreamBranch {
    branch: Option<Branch>,
}

/// API access for branches.
#[derive(Debug, Clone)]
pub struct BranchResource {
    conn: Connection,
}

impl BranchResource {
    /// A branch client over `conn`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Lists the branches of a stream, each with a page of its latest commits.
    #[instrument(skip(self), fields(stream = %stream_id))]
    pub async fn list(
        &self,
        stream_id: &StreamId,
        branches_limit: u32,
        commits_limit: u32,
    ) -> Result<Vec<Branch>, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::BRANCH_LIST,
            json!({
                "stream_id": stream_id,
                "branches_limit": branches_limit,
                "commits_limit": commits_limit,
            }),
        );
        let data: BranchListData = self.conn.send(request).await?;
        let mut branches = data
            .stream
            .and_then(|s| s.branches)
            .and_then(|b| b.items)
            .ok_or_else(|| missing(&catalog::BRANCH_LIST))?;

        for branch in &mut branches {
            attach_stream(branch, stream_id);
        }
        Ok(branches)
    }

    /// Fetches one branch by name.
    #[instrument(skip(self), fields(stream = %stream_id))]
    pub async fn get(
        &self,
        stream_id: &StreamId,
        name: &str,
        commits_limit: u32,
    ) -> Result<Branch, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::BRANCH_GET,
            json!({
                "stream_id": stream_id,
                "name": name,
                "commits_limit": commits_limit,
            }),
        );
        let data: BranchGetData = self.conn.send(request).await?;
        let mut branch = data
            .stream
            .and_then(|s| s.branch)
            .ok_or_else(|| missing(&catalog::BRANCH_GET))?;
        attach_stream(&mut branch, stream_id);
        Ok(branch)
    }
}

fn attach_stream(branch: &mut Branch, stream_id: &StreamId) {
    branch.stream_id = Some(stream_id.clone());
    if let Some(commits) = &mut branch.commits {
        for commit in &mut commits.items {
            commit.stream_id = Some(stream_id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::FetchPolicy;
    use crate::test_support::{sample_account, RecordingTracker, StubExecutor};
    use std::sync::Arc;

    fn resource(stub: Arc<StubExecutor>) -> BranchResource {
        BranchResource::new(Connection::new(
            stub,
            sample_account(),
            None,
            Arc::new(RecordingTracker::default()),
            FetchPolicy::AlwaysFresh,
        ))
    }

    #[tokio::test]
    async fn list_unwraps_items_and_links_stream() {
        let stub = Arc::new(StubExecutor::new().respond(json!({
            "stream": {
                "id": "s1",
                "branches": {
                    "totalCount": 2,
                    "items": [
                        {
                            "id": "b1",
                            "name": "main",
                            "commits": { "totalCount": 5, "items": [{ "id": "c1" }] }
                        },
                        { "id": "b2", "name": "design/facade", "commits": { "totalCount": 0, "items": [] } }
                    ]
                }
            }
        })));
        let stream_id = StreamId::new("s1").unwrap();

        let branches = resource(stub.clone()).list(&stream_id, 10, 10).await.unwrap();

        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].commit_count(), 5);
        assert_eq!(branches[0].stream_id.as_ref(), Some(&stream_id));
        let commits = branches[0].commits.as_ref().unwrap();
        assert_eq!(commits.items[0].stream_id.as_ref(), Some(&stream_id));
        assert_eq!(
            stub.single_call_variables(),
            json!({ "stream_id": "s1", "branches_limit": 10, "commits_limit": 10 })
        );
    }

    #[tokio::test]
    async fn get_missing_branch_is_an_error() {
        let stub = Arc::new(StubExecutor::new().respond(json!({
            "stream": { "id": "s1", "branch": null }
        })));
        let err = resource(stub)
            .get(&StreamId::new("s1").unwrap(), "nope", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingData { .. }));
    }

    #[tokio::test]
    async fn get_returns_named_branch() {
        let stub = Arc::new(StubExecutor::new().respond(json!({
            "stream": { "id": "s1", "branch": { "id": "b1", "name": "main" } }
        })));
        let branch = resource(stub.clone())
            .get(&StreamId::new("s1").unwrap(), "main", 3)
            .await
            .unwrap();
        assert_eq!(branch.name, "main");
        assert_eq!(
            stub.single_call_variables(),
            json!({ "stream_id": "s1", "name": "main", "commits_limit": 3 })
        );
    }
}
