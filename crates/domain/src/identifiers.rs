//! Newtype domain identifiers.
//!
//! Every entity the server hands out an identity for is represented as a
//! distinct newtype wrapping a string. This prevents accidentally passing a
//! [`CommitId`] where a [`StreamId`] is expected even though both are opaque
//! strings on the wire.
//!
//! Identifiers are always assigned by the server. Nothing in this workspace
//! generates one locally; [`SessionId`] is the only locally generated value
//! and it never leaves the usage-tracking path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: server-assigned
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a stream: the access-controlled project container holding
    /// branches and commits.
    StreamId
}

string_id! {
    /// Identifies an object by its content hash.
    ObjectId
}

string_id! {
    /// Identifies a commit within a stream.
    CommitId
}

string_id! {
    /// Identifies a branch within a stream.
    ///
    /// Branch lookups by the server use the branch *name*; this id is only
    /// carried for display and correlation.
    BranchId
}

string_id! {
    /// Identifies a user account on the server.
    UserId
}

string_id! {
    /// Identifies a pending stream invite.
    InviteId
}

// ---------------------------------------------------------------------------
// Identifiers: locally generated
// ---------------------------------------------------------------------------

/// Identifies one process run of the client.
///
/// Generated once per [`Account`](crate::Account) authentication and attached
/// to every usage-tracking event so all activity from one run can be
/// correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a new random session identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Connection parameters
// ---------------------------------------------------------------------------

/// Base URL of a server, normalised to `scheme://host[:port][/path]` with no
/// trailing slash.
///
/// Hosts given without a scheme (e.g. `"macad.speckle.xyz"`) are assumed to
/// be served over HTTPS.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerUrl(String);

impl ServerUrl {
    /// Normalises `value` into a [`ServerUrl`], returning `None` when it is
    /// blank or consists only of a scheme.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("https://") {
            ("https", rest)
        } else if let Some(rest) = trimmed.strip_prefix("http://") {
            ("http", rest)
        } else {
            ("https", trimmed)
        };

        let rest = rest.trim_end_matches('/');
        if rest.is_empty() {
            return None;
        }

        Some(Self(format!("{scheme}://{rest}")))
    }

    /// Returns the base URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The GraphQL endpoint of this server.
    pub fn graphql_endpoint(&self) -> String {
        format!("{}/graphql", self.0)
    }

    /// The embeddable 3D viewer URL for one commit of a stream.
    pub fn embed_url(&self, stream: &StreamId, commit: &CommitId) -> String {
        format!("{}/embed?stream={}&commit={}", self.0, stream, commit)
    }
}

impl TryFrom<String> for ServerUrl {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid server url: {value:?}"))
    }
}

impl From<ServerUrl> for String {
    fn from(url: ServerUrl) -> Self {
        url.0
    }
}

impl std::fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A personal access token.
///
/// `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken(String);

impl AuthToken {
    /// Creates a token, returning `None` if the value is blank.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let v = value.into();
        if v.trim().is_empty() {
            None
        } else {
            Some(Self(v.trim().to_string()))
        }
    }

    /// Returns the raw secret for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

impl std::fmt::Display for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_identifiers_are_rejected() {
        assert!(StreamId::new("").is_none());
        assert_eq!(StreamId::new("a1b2").unwrap().as_str(), "a1b2");
    }

    #[test]
    fn identifiers_serialise_as_plain_strings() {
        let id = CommitId::new("c0ffee").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"c0ffee\"");
        let back: CommitId = serde_json::from_str("\"c0ffee\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn bare_host_defaults_to_https() {
        let url = ServerUrl::parse("macad.speckle.xyz").unwrap();
        assert_eq!(url.as_str(), "https://macad.speckle.xyz");
        assert_eq!(url.graphql_endpoint(), "https://macad.speckle.xyz/graphql");
    }

    #[test]
    fn explicit_scheme_and_trailing_slash() {
        let url = ServerUrl::parse("http://localhost:3000/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000");
    }

    #[test]
    fn blank_or_scheme_only_urls_are_rejected() {
        assert!(ServerUrl::parse("   ").is_none());
        assert!(ServerUrl::parse("https://").is_none());
    }

    #[test]
    fn embed_url_points_at_commit() {
        let url = ServerUrl::parse("macad.speckle.xyz").unwrap();
        let stream = StreamId::new("s1").unwrap();
        let commit = CommitId::new("c1").unwrap();
        assert_eq!(
            url.embed_url(&stream, &commit),
            "https://macad.speckle.xyz/embed?stream=s1&commit=c1"
        );
    }

    #[test]
    fn token_is_redacted() {
        let token = AuthToken::new("  secret-value ").unwrap();
        assert_eq!(token.expose(), "secret-value");
        assert_eq!(format!("{token:?}"), "AuthToken(***)");
        assert_eq!(token.to_string(), "***");
        assert!(AuthToken::new(" ").is_none());
    }
}
