//! Commit resource.

use domain::{ApiError, Commit, CommitId, GraphQlRequest, StreamId};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::catalog;
use crate::connection::{missing, Connection};

#[derive(Deserialize)]
struct CommitListData {
    stream: Option<StreamCommits>,
}

#[derive(Deserialize)]
struct StreamCommits {
    commits: Option<CommitItems>,
}

#[derive(Deserialize)]
struct CommitItems {
    items: Option<Vec<Commit>>,
}

#[derive(Deserialize)]
struct CommitGetData {
    stream: Option<StreamCommit>,
}

#[derive(Deserialize)]
struct StreamCommit {
    commit: Option<Commit>,
}

/// API access for commits.
#[derive(Debug, Clone)]
pub struct CommitResource {
    conn: Connection,
}

impl CommitResource {
    /// A commit client over `conn`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Lists the most recent commits across all branches of a stream,
    /// newest first.
    #[instrument(skip(self), fields(stream = %stream_id))]
    pub async fn list(&self, stream_id: &StreamId, limit: u32) -> Result<Vec<Commit>, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::COMMIT_LIST,
            json!({ "stream_id": stream_id, "limit": limit }),
        );
        let data: CommitListData = self.conn.send(request).await?;
        let mut commits = data
            .stream
            .and_then(|s| s.commits)
            .and_then(|c| c.items)
            .ok_or_else(|| missing(&catalog::COMMIT_LIST))?;

        for commit in &mut commits {
            commit.stream_id = Some(stream_id.clone());
        }
        Ok(commits)
    }

    /// Fetches one commit of a stream.
    #[instrument(skip(self), fields(stream = %stream_id, commit = %commit_id))]
    pub async fn get(
        &self,
        stream_id: &StreamId,
        commit_id: &CommitId,
    ) -> Result<Commit, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::COMMIT_GET,
            json!({ "stream_id": stream_id, "commit_id": commit_id }),
        );
        let data: CommitGetData = self.conn.send(request).await?;
        let mut commit = data
            .stream
            .and_then(|s| s.commit)
            .ok_or_else(|| missing(&catalog::COMMIT_GET))?;
        commit.stream_id = Some(stream_id.clone());
        Ok(commit)
    }
}
