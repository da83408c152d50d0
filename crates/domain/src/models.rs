//! Domain models decoded from server responses.
//!
//! Every model is a point-in-time snapshot of data owned by the server. There
//! is no local mutation and no cache invalidation; re-fetching is the only way
//! to observe a change.
//!
//! Field names follow the server's camelCase wire format. Optional fields are
//! tolerated as missing because most queries select only a subset of them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{AuthToken, BranchId, CommitId, InviteId, ObjectId, ServerUrl, StreamId, UserId};

/// Decodes a list that the server may send as `null`; absent and `null` both
/// become empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// The calendar date of this timestamp in UTC.
    pub fn date(self) -> NaiveDate {
        self.0.date_naive()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a server-side collection (`{ totalCount cursor items }`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    /// Size of the whole collection on the server, not just this page.
    #[serde(default)]
    pub total_count: u64,
    /// Opaque cursor for the next page, if any.
    #[serde(default)]
    pub cursor: Option<String>,
    /// The items on this page.
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub items: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            total_count: 0,
            cursor: None,
            items: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Server and users
// ---------------------------------------------------------------------------

/// A role the server defines (e.g. `stream:owner`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRole {
    /// Role name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// The kind of resource the role applies to (`streams`, `server`).
    #[serde(default)]
    pub resource_target: Option<String>,
}

/// Public information about a server, from `serverInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub admin_contact: Option<String>,
    #[serde(default)]
    pub canonical_url: Option<String>,
    /// Version string as reported; see [`crate::ServerVersion::parse`].
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<ServerRole>,
}

/// The authenticated user, from `activeUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub role: Option<String>,
}

/// The public subset of another user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitedUser {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Credentials and identity for one server.
///
/// Built from a local account store or from a user-supplied token; treated as
/// immutable once authentication has filled in [`Account::user`] and
/// [`Account::server`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub server_url: ServerUrl,
    pub token: AuthToken,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub server: Option<ServerInfo>,
}

impl Account {
    /// An account that has not yet been checked against its server.
    pub fn unauthenticated(server_url: ServerUrl, token: AuthToken) -> Self {
        Self {
            server_url,
            token,
            is_default: false,
            user: None,
            server: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// A user with a role on a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: UserId,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A named, access-controlled project container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub id: StreamId,
    pub name: String,
    /// The requesting user's role on this stream.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
    #[serde(default)]
    pub favorited_date: Option<Timestamp>,
    #[serde(default)]
    pub favorites_count: Option<u64>,
    #[serde(default)]
    pub comment_count: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub branches: Option<Page<Branch>>,
}

/// An invite to a stream that has not been accepted or declined yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingStreamCollaborator {
    #[serde(default)]
    pub id: Option<String>,
    pub invite_id: InviteId,
    pub stream_id: StreamId,
    #[serde(default)]
    pub stream_name: Option<String>,
    /// Display title of the invitee (a name, or the email address for
    /// invites to people without an account).
    #[serde(default)]
    pub title: Option<String>,
    pub role: String,
    #[serde(default)]
    pub invited_by: Option<LimitedUser>,
    /// The invited user, when the invite targets an existing account.
    #[serde(default)]
    pub user: Option<LimitedUser>,
    /// Only visible to the invitee.
    #[serde(default)]
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Branches and commits
// ---------------------------------------------------------------------------

/// A named line of commits within a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub commits: Option<Page<Commit>>,
    /// The stream this branch was fetched from. Lookup only; filled in by the
    /// client, never sent by the server.
    #[serde(skip)]
    pub stream_id: Option<StreamId>,
}

impl Branch {
    /// Total number of commits on the branch, as reported by the server.
    pub fn commit_count(&self) -> u64 {
        self.commits.as_ref().map_or(0, |c| c.total_count)
    }
}

/// A versioned snapshot reference within a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: CommitId,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub referenced_object: Option<ObjectId>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_id: Option<UserId>,
    #[serde(default)]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    /// The connector that produced the commit (e.g. `"Rhino"`).
    #[serde(default)]
    pub source_application: Option<String>,
    #[serde(default)]
    pub total_children_count: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parents: Vec<String>,
    /// The stream this commit was fetched from. Lookup only; filled in by the
    /// client, never sent by the server.
    #[serde(skip)]
    pub stream_id: Option<StreamId>,
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// A content-addressed data node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeckleObject {
    pub id: ObjectId,
    #[serde(default)]
    pub speckle_type: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub total_children_count: Option<u64>,
    /// The opaque payload; never interpreted by this client.
    #[serde(default)]
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_decodes_from_wire_format() {
        let stream: Stream = serde_json::from_value(json!({
            "id": "s1",
            "name": "Tower",
            "isPublic": true,
            "createdAt": "2024-01-01T09:30:00.000Z",
            "collaborators": [
                { "id": "u1", "name": "Ada", "role": "stream:owner" }
            ],
            "branches": {
                "totalCount": 2,
                "items": [
                    { "id": "b1", "name": "main", "commits": { "totalCount": 4, "items": [] } }
                ]
            }
        }))
        .unwrap();

        assert_eq!(stream.id.as_str(), "s1");
        assert_eq!(stream.is_public, Some(true));
        assert_eq!(
            stream.created_at.unwrap().date(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(stream.collaborators[0].name, "Ada");
        let branches = stream.branches.unwrap();
        assert_eq!(branches.total_count, 2);
        assert_eq!(branches.items[0].commit_count(), 4);
        assert_eq!(branches.items[0].stream_id, None);
    }

    #[test]
    fn commit_tolerates_missing_optional_fields() {
        let commit: Commit = serde_json::from_value(json!({ "id": "c1" })).unwrap();
        assert_eq!(commit.id.as_str(), "c1");
        assert!(commit.source_application.is_none());
        assert!(commit.parents.is_empty());
    }

    #[test]
    fn null_lists_decode_as_empty() {
        let commit: Commit =
            serde_json::from_value(json!({ "id": "c1", "parents": null })).unwrap();
        assert!(commit.parents.is_empty());

        let stream: Stream = serde_json::from_value(json!({
            "id": "s1",
            "name": "Tower",
            "collaborators": null,
            "branches": { "totalCount": 0, "items": null }
        }))
        .unwrap();
        assert!(stream.collaborators.is_empty());
        assert!(stream.branches.unwrap().items.is_empty());

        let info: ServerInfo = serde_json::from_value(json!({ "roles": null })).unwrap();
        assert!(info.roles.is_empty());
    }

    #[test]
    fn branch_without_commit_page_counts_zero() {
        let branch: Branch =
            serde_json::from_value(json!({ "id": "b1", "name": "main" })).unwrap();
        assert_eq!(branch.commit_count(), 0);
    }

    #[test]
    fn object_keeps_payload_opaque() {
        let object: SpeckleObject = serde_json::from_value(json!({
            "id": "abc123",
            "speckleType": "Objects.Geometry.Mesh",
            "totalChildrenCount": 3,
            "data": { "vertices": [0, 1, 2] }
        }))
        .unwrap();
        assert_eq!(object.speckle_type.as_deref(), Some("Objects.Geometry.Mesh"));
        assert_eq!(object.data["vertices"][2], 2);
    }
}
