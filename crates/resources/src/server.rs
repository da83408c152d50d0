//! Server and active-user resources.

use domain::{ApiError, GraphQlRequest, ServerInfo, ServerVersion, User};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::catalog;
use crate::connection::{missing, Connection};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerInfoData {
    server_info: Option<ServerInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveUserData {
    active_user: Option<User>,
}

/// API access for public server information.
#[derive(Debug, Clone)]
pub struct ServerResource {
    conn: Connection,
}

impl ServerResource {
    /// A server metadata client over `conn`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Name, version, and roles the server reports about itself.
    #[instrument(skip(self))]
    pub async fn info(&self) -> Result<ServerInfo, ApiError> {
        let request = GraphQlRequest::new(&catalog::SERVER_INFO, json!({}));
        let data: ServerInfoData = self.conn.send(request).await?;
        data.server_info
            .ok_or_else(|| missing(&catalog::SERVER_INFO))
    }

    /// The server's version, or `None` when it reports none or an
    /// unrecognised format.
    pub async fn version(&self) -> Result<Option<ServerVersion>, ApiError> {
        let info = self.info().await?;
        Ok(parse_reported_version(&info))
    }
}

pub(crate) fn parse_reported_version(info: &ServerInfo) -> Option<ServerVersion> {
    let raw = info.version.as_deref()?;
    let parsed = ServerVersion::parse(raw);
    if parsed.is_none() {
        tracing::warn!(
            version = raw,
            "server reported an unrecognised version; version gates disabled"
        );
    }
    parsed
}

/// API access for the authenticated user's profile.
#[derive(Debug, Clone)]
pub struct ActiveUserResource {
    conn: Connection,
}

impl ActiveUserResource {
    /// An active-user client over `conn`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// The user the connection's token belongs to.
    ///
    /// Servers answer `null` for anonymous requests; that surfaces as
    /// [`ApiError::MissingData`].
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<User, ApiError> {
        let request = GraphQlRequest::new(&catalog::ACTIVE_USER, json!({}));
        let data: ActiveUserData = self.conn.send(request).await?;
        data.active_user
            .ok_or_else(|| missing(&catalog::ACTIVE_USER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::FetchPolicy;
    use crate::test_support::{sample_account, RecordingTracker, StubExecutor};
    use std::sync::Arc;

    fn connection(stub: Arc<StubExecutor>) -> Connection {
        Connection::new(
            stub,
            sample_account(),
            None,
            Arc::new(RecordingTracker::default()),
            FetchPolicy::AlwaysFresh,
        )
    }

    #[tokio::test]
    async fn version_is_parsed_from_server_info() {
        let stub = Arc::new(StubExecutor::new().respond(json!({
            "serverInfo": { "name": "MaCAD", "version": "2.9.1", "roles": [] }
        })));
        let version = ServerResource::new(connection(stub)).version().await.unwrap();
        assert_eq!(version, Some(ServerVersion::new(2, 9, 1)));
    }

    #[tokio::test]
    async fn unrecognised_version_is_none() {
        let stub = Arc::new(StubExecutor::new().respond(json!({
            "serverInfo": { "version": "nightly" }
        })));
        let version = ServerResource::new(connection(stub)).version().await.unwrap();
        assert_eq!(version, None);
    }

    #[tokio::test]
    async fn anonymous_active_user_is_missing_data() {
        let stub = Arc::new(StubExecutor::new().respond(json!({ "activeUser": null })));
        let err = ActiveUserResource::new(connection(stub)).get().await.unwrap_err();
        assert!(matches!(err, ApiError::MissingData { .. }));
    }
}
