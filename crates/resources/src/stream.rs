//! Stream resource: CRUD, search, favourites, permissions, and invites.

use domain::{ApiError, GraphQlRequest, PendingStreamCollaborator, Stream, StreamId, UserId};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::instrument;

use crate::catalog;
use crate::connection::{missing, Connection};

/// Branch and commit page sizes for queries that embed them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestedLimits {
    pub branches: u32,
    pub commits: u32,
}

impl Default for NestedLimits {
    fn default() -> Self {
        Self {
            branches: 10,
            commits: 10,
        }
    }
}

/// Options for [`StreamResource::search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// Maximum number of streams returned.
    pub limit: u32,
    pub nested: NestedLimits,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 25,
            nested: NestedLimits::default(),
        }
    }
}

/// Input for [`StreamResource::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStream {
    pub name: String,
    pub description: String,
    /// Whether anyone with the id can view the stream.
    pub is_public: bool,
}

impl Default for NewStream {
    fn default() -> Self {
        Self {
            name: "Anonymous Rust Stream".to_string(),
            description: "No description provided".to_string(),
            is_public: true,
        }
    }
}

/// Input for [`StreamResource::update`]. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamUpdate {
    pub id: StreamId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

impl StreamUpdate {
    /// An update for `id` that changes nothing until fields are set.
    pub fn new(id: StreamId) -> Self {
        Self {
            id,
            name: None,
            description: None,
            is_public: None,
        }
    }
}

/// The default role for new invites.
pub const DEFAULT_INVITE_ROLE: &str = "stream:contributor";

/// Input for [`StreamResource::invite`]. One of `email` or `user_id` is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInvite {
    pub stream_id: StreamId,
    pub email: Option<String>,
    pub user_id: Option<UserId>,
    pub role: String,
    pub message: Option<String>,
}

impl StreamInvite {
    /// An invite by email with the default role.
    pub fn by_email(stream_id: StreamId, email: impl Into<String>) -> Self {
        Self {
            stream_id,
            email: Some(email.into()),
            user_id: None,
            role: DEFAULT_INVITE_ROLE.to_string(),
            message: None,
        }
    }

    /// An invite of an existing user with the default role.
    pub fn by_user(stream_id: StreamId, user_id: UserId) -> Self {
        Self {
            stream_id,
            email: None,
            user_id: Some(user_id),
            role: DEFAULT_INVITE_ROLE.to_string(),
            message: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Response envelopes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StreamData {
    stream: Option<Stream>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamListData {
    active_user: Option<ActiveUserStreams>,
}

#[derive(Deserialize)]
struct ActiveUserStreams {
    streams: Option<Items<Stream>>,
}

#[derive(Deserialize)]
struct StreamSearchData {
    streams: Option<Items<Stream>>,
}

#[derive(Deserialize)]
struct Items<T> {
    items: Option<Vec<T>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamInvitesData {
    stream: Option<PendingCollaborators>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PendingCollaborators {
    pending_collaborators: Option<Vec<PendingStreamCollaborator>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamCreateData {
    stream_create: Option<StreamId>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamFavoriteData {
    stream_favorite: Option<Stream>,
}

/// `{ "<field>": bool }` envelopes shared by the acknowledgment mutations.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Acknowledged {
    stream_update: Option<bool>,
    stream_delete: Option<bool>,
    stream_grant_permission: Option<bool>,
    stream_update_permission: Option<bool>,
    stream_revoke_permission: Option<bool>,
    stream_invite_create: Option<bool>,
    stream_invite_batch_create: Option<bool>,
    stream_invite_cancel: Option<bool>,
    stream_invite_use: Option<bool>,
}

// ---------------------------------------------------------------------------
// Resource
// ---------------------------------------------------------------------------

/// API access for streams.
#[derive(Debug, Clone)]
pub struct StreamResource {
    conn: Connection,
}

impl StreamResource {
    /// A stream client over `conn`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Fetches one stream with its collaborators and a page of branches, each
    /// with a page of commits.
    #[instrument(skip(self), fields(stream = %id))]
    pub async fn get(&self, id: &StreamId, limits: NestedLimits) -> Result<Stream, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_GET,
            json!({
                "id": id,
                "branch_limit": limits.branches,
                "commit_limit": limits.commits,
            }),
        );
        let data: StreamData = self.conn.send(request).await?;
        data.stream.ok_or_else(|| missing(&catalog::STREAM_GET))
    }

    /// Lists the authenticated user's streams.
    #[instrument(skip(self))]
    pub async fn list(&self, stream_limit: u32) -> Result<Vec<Stream>, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_LIST,
            json!({ "stream_limit": stream_limit }),
        );
        let data: StreamListData = self.conn.send(request).await?;
        data.active_user
            .and_then(|user| user.streams)
            .and_then(|page| page.items)
            .ok_or_else(|| missing(&catalog::STREAM_LIST))
    }

    /// Creates a stream and returns its server-assigned id.
    #[instrument(skip(self, stream), fields(name = %stream.name))]
    pub async fn create(&self, stream: &NewStream) -> Result<StreamId, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_CREATE,
            json!({
                "stream": {
                    "name": stream.name,
                    "description": stream.description,
                    "isPublic": stream.is_public,
                }
            }),
        );
        let data: StreamCreateData = self.conn.send(request).await?;
        data.stream_create
            .ok_or_else(|| missing(&catalog::STREAM_CREATE))
    }

    /// Updates the given fields of a stream.
    #[instrument(skip(self, update), fields(stream = %update.id))]
    pub async fn update(&self, update: &StreamUpdate) -> Result<bool, ApiError> {
        let mut input = Map::new();
        input.insert("id".into(), json!(update.id));
        if let Some(name) = &update.name {
            input.insert("name".into(), json!(name));
        }
        if let Some(description) = &update.description {
            input.insert("description".into(), json!(description));
        }
        if let Some(is_public) = update.is_public {
            input.insert("isPublic".into(), json!(is_public));
        }

        let request = GraphQlRequest::new(
            &catalog::STREAM_UPDATE,
            json!({ "stream": Value::Object(input) }),
        );
        let data: Acknowledged = self.conn.send(request).await?;
        data.stream_update
            .ok_or_else(|| missing(&catalog::STREAM_UPDATE))
    }

    /// Deletes a stream. The caller must own it.
    #[instrument(skip(self), fields(stream = %id))]
    pub async fn delete(&self, id: &StreamId) -> Result<bool, ApiError> {
        let request = GraphQlRequest::new(&catalog::STREAM_DELETE, json!({ "id": id }));
        let data: Acknowledged = self.conn.send(request).await?;
        data.stream_delete
            .ok_or_else(|| missing(&catalog::STREAM_DELETE))
    }

    /// Searches streams by name, description, or id.
    ///
    /// Results are in server order; an empty list means nothing matched.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<Stream>, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_SEARCH,
            json!({
                "search_query": query,
                "limit": options.limit,
                "branch_limit": options.nested.branches,
                "commit_limit": options.nested.commits,
            }),
        );
        let data: StreamSearchData = self.conn.send(request).await?;
        data.streams.and_then(|page| page.items).ok_or_else(|| missing(&catalog::STREAM_SEARCH))
    }

    /// Favourites (`favorited = true`) or unfavourites a stream.
    ///
    /// The returned stream carries only `id`, `name`, `favoritedDate` and
    /// `favoritesCount`.
    #[instrument(skip(self), fields(stream = %stream_id))]
    pub async fn favorite(
        &self,
        stream_id: &StreamId,
        favorited: bool,
    ) -> Result<Stream, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_FAVORITE,
            json!({ "stream_id": stream_id, "favorited": favorited }),
        );
        let data: StreamFavoriteData = self.conn.send(request).await?;
        data.stream_favorite
            .ok_or_else(|| missing(&catalog::STREAM_FAVORITE))
    }

    /// Grants `role` on a stream to a user directly.
    ///
    /// Only servers older than v2.6.4 accept this; newer servers (and `dev`)
    /// are rejected locally with [`ApiError::UnsupportedOperation`]. Use
    /// [`Self::update_permission`] or [`Self::invite`] instead.
    #[deprecated(note = "removed in server v2.6.4; use `update_permission` or `invite`")]
    #[instrument(skip(self), fields(stream = %stream_id, user = %user_id))]
    pub async fn grant_permission(
        &self,
        stream_id: &StreamId,
        user_id: &UserId,
        role: &str,
    ) -> Result<bool, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_GRANT_PERMISSION,
            json!({
                "permission_params": {
                    "streamId": stream_id,
                    "userId": user_id,
                    "role": role,
                }
            }),
        )
        .with_tracking_role(role);
        let data: Acknowledged = self.conn.send(request).await?;
        data.stream_grant_permission
            .ok_or_else(|| missing(&catalog::STREAM_GRANT_PERMISSION))
    }

    /// Changes an existing collaborator's role. Requires server v2.6.4+.
    #[instrument(skip(self), fields(stream = %stream_id, user = %user_id))]
    pub async fn update_permission(
        &self,
        stream_id: &StreamId,
        user_id: &UserId,
        role: &str,
    ) -> Result<bool, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_UPDATE_PERMISSION,
            json!({
                "permission_params": {
                    "streamId": stream_id,
                    "userId": user_id,
                    "role": role,
                }
            }),
        )
        .with_tracking_role(role);
        let data: Acknowledged = self.conn.send(request).await?;
        data.stream_update_permission
            .ok_or_else(|| missing(&catalog::STREAM_UPDATE_PERMISSION))
    }

    /// Removes a collaborator from a stream.
    #[instrument(skip(self), fields(stream = %stream_id, user = %user_id))]
    pub async fn revoke_permission(
        &self,
        stream_id: &StreamId,
        user_id: &UserId,
    ) -> Result<bool, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_REVOKE_PERMISSION,
            json!({
                "permission_params": {
                    "streamId": stream_id,
                    "userId": user_id,
                }
            }),
        );
        let data: Acknowledged = self.conn.send(request).await?;
        data.stream_revoke_permission
            .ok_or_else(|| missing(&catalog::STREAM_REVOKE_PERMISSION))
    }

    /// Lists the pending invites on a stream. The caller must own the stream.
    #[instrument(skip(self), fields(stream = %stream_id))]
    pub async fn get_all_pending_invites(
        &self,
        stream_id: &StreamId,
    ) -> Result<Vec<PendingStreamCollaborator>, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_INVITES,
            json!({ "stream_id": stream_id }),
        );
        let data: StreamInvitesData = self.conn.send(request).await?;
        let stream = data.stream
            .ok_or_else(|| missing(&catalog::STREAM_INVITES))?;
        Ok(stream.pending_collaborators.unwrap_or_default())
    }

    /// Invites someone to a stream by email or user id.
    #[instrument(skip(self, invite), fields(stream = %invite.stream_id))]
    pub async fn invite(&self, invite: &StreamInvite) -> Result<bool, ApiError> {
        let mut request = GraphQlRequest::new(
            &catalog::STREAM_INVITE_CREATE,
            json!({
                "input": invite_input(
                    &invite.stream_id,
                    invite.email.as_deref(),
                    invite.user_id.as_ref(),
                    Some(&invite.role),
                    invite.message.as_deref(),
                )
            }),
        );
        if invite.email.is_none() && invite.user_id.is_none() {
            request = request.with_invalid_input("provide either an email or a user id");
        }
        let data: Acknowledged = self.conn.send(request).await?;
        data.stream_invite_create
            .ok_or_else(|| missing(&catalog::STREAM_INVITE_CREATE))
    }

    /// Invites several people at once. Every invite uses the server's default role.
    #[instrument(skip(self, emails, user_ids, message), fields(stream = %stream_id))]
    pub async fn invite_batch(
        &self,
        stream_id: &StreamId,
        emails: &[String],
        user_ids: &[UserId],
        message: Option<&str>,
    ) -> Result<bool, ApiError> {
        let inputs_empty = emails.is_empty() && user_ids.is_empty();
        let inputs: Vec<Value> = emails
            .iter()
            .map(|email| invite_input(stream_id, Some(email), None, None, message))
            .chain(
                user_ids
                    .iter()
                    .map(|user| invite_input(stream_id, None, Some(user), None, message)),
            )
            .collect();

        let mut request = GraphQlRequest::new(
            &catalog::STREAM_INVITE_BATCH_CREATE,
            json!({ "input": inputs }),
        );
        if inputs_empty {
            request = request.with_invalid_input("provide at least one email or user id");
        }
        let data: Acknowledged = self.conn.send(request).await?;
        data.stream_invite_batch_create
            .ok_or_else(|| missing(&catalog::STREAM_INVITE_BATCH_CREATE))
    }

    /// Cancels a pending invite. The caller must own the stream.
    #[instrument(skip(self), fields(stream = %stream_id, invite = %invite_id))]
    pub async fn invite_cancel(
        &self,
        stream_id: &StreamId,
        invite_id: &domain::InviteId,
    ) -> Result<bool, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_INVITE_CANCEL,
            json!({ "stream_id": stream_id, "invite_id": invite_id }),
        );
        let data: Acknowledged = self.conn.send(request).await?;
        data.stream_invite_cancel
            .ok_or_else(|| missing(&catalog::STREAM_INVITE_CANCEL))
    }

    /// Accepts (`accept = true`) or declines an invite addressed to the caller.
    #[instrument(skip(self, token), fields(stream = %stream_id))]
    pub async fn invite_use(
        &self,
        stream_id: &StreamId,
        token: &str,
        accept: bool,
    ) -> Result<bool, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::STREAM_INVITE_USE,
            json!({ "accept": accept, "stream_id": stream_id, "token": token }),
        );
        let data: Acknowledged = self.conn.send(request).await?;
        data.stream_invite_use
            .ok_or_else(|| missing(&catalog::STREAM_INVITE_USE))
    }
}

fn invite_input(
    stream_id: &StreamId,
    email: Option<&str>,
    user_id: Option<&UserId>,
    role: Option<&str>,
    message: Option<&str>,
) -> Value {
    let mut input = Map::new();
    input.insert("streamId".into(), json!(stream_id));
    if let Some(email) = email {
        input.insert("email".into(), json!(email));
    }
    if let Some(user_id) = user_id {
        input.insert("userId".into(), json!(user_id));
    }
    if let Some(role) = role {
        input.insert("role".into(), json!(role));
    }
    if let Some(message) = message {
        input.insert("message".into(), json!(message));
    }
    Value::Object(input)
}

/// Picks the stream the operator asked for out of search results: the first
/// whose name equals `name`.
///
/// Search matches substrings of names, descriptions and ids, so a result
/// that merely contains `name` is not selected. Returns `None` when no
/// result has that exact name.
pub fn select_stream(results: Vec<Stream>, name: &str) -> Option<Stream> {
    results.into_iter().find(|s| s.name == name)
}
