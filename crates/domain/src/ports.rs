//! Port traits: what the resource layer needs from the outside world.
//!
//! - [`RequestExecutor`] sends one GraphQL operation and returns its `data`.
//!   The HTTP implementation lives in the `transport` crate; decorators in the
//!   `resources` crate wrap it.
//! - [`UsageTracker`] receives a fire-and-forget event per operation.
//!
//! [`Operation`] is the static descriptor every catalog entry is built from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Account, ApiError, SessionId, TrackingError, VersionGate};

// ---------------------------------------------------------------------------
// Operation descriptors
// ---------------------------------------------------------------------------

/// Whether an operation reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Query,
    Mutation,
}

/// Usage-tracking category an operation reports under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingCategory {
    Sdk,
    Stream,
    Permission,
    Invite,
    Object,
    Branch,
    Commit,
}

impl std::fmt::Display for TrackingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Sdk => "sdk",
            Self::Stream => "stream",
            Self::Permission => "permission",
            Self::Invite => "invite",
            Self::Object => "object",
            Self::Branch => "branch",
            Self::Commit => "commit",
        };
        f.write_str(s)
    }
}

/// A parameterised GraphQL operation with its declared input and output shape.
///
/// Pure data. The document must match the server's operation signature
/// exactly; a mismatch is reported by the server, not detected locally.
#[derive(Debug)]
pub struct Operation {
    /// GraphQL operation name, sent as `operationName`.
    pub name: &'static str,
    /// Query or mutation; mutations are never served from a cache.
    pub kind: OperationKind,
    /// The full GraphQL document.
    pub document: &'static str,
    /// Names of the top-level variables the document declares.
    pub variables: &'static [&'static str],
    /// Field path from `data` to the payload, e.g. `["stream", "object"]`.
    pub response_path: &'static [&'static str],
    /// Server versions the operation may be sent to.
    pub gate: Option<VersionGate>,
    /// Category reported in the tracking event.
    pub tracking: TrackingCategory,
    /// Name reported in the tracking event.
    pub tracking_name: &'static str,
}

impl Operation {
    /// The response path joined with dots, for messages.
    pub fn path_display(&self) -> String {
        self.response_path.join(".")
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One operation bound to its variables.
#[derive(Debug, Clone)]
pub struct GraphQlRequest {
    pub operation: &'static Operation,
    pub variables: Map<String, Value>,
    /// Extra tracking detail (the role, for permission operations).
    pub tracking_role: Option<String>,
    /// Why the input is unusable, when the caller found it so. The request is
    /// still tracked and version-gated, then fails with
    /// [`ApiError::InvalidArgument`] instead of being sent.
    pub invalid_input: Option<String>,
}

impl GraphQlRequest {
    /// Binds `variables` to `operation`.
    ///
    /// Non-object values are treated as "no variables".
    pub fn new(operation: &'static Operation, variables: Value) -> Self {
        let variables = match variables {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            operation,
            variables,
            tracking_role: None,
            invalid_input: None,
        }
    }

    /// Attaches a role to the tracking event for this request.
    pub fn with_tracking_role(mut self, role: impl Into<String>) -> Self {
        self.tracking_role = Some(role.into());
        self
    }

    /// Marks the input as unusable; see [`GraphQlRequest::invalid_input`].
    pub fn with_invalid_input(mut self, message: impl Into<String>) -> Self {
        self.invalid_input = Some(message.into());
        self
    }

    /// The JSON body `{query, variables, operationName}` sent over the wire.
    pub fn to_body(&self) -> Value {
        serde_json::json!({
            "query": self.operation.document,
            "variables": Value::Object(self.variables.clone()),
            "operationName": self.operation.name,
        })
    }
}

/// Sends GraphQL operations to a server.
///
/// Implementations own the authenticated connection. They return the
/// `data` member of the response envelope, or a [`ApiError::Service`] when
/// the server reports errors or cannot be reached.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value, ApiError>;
}

// ---------------------------------------------------------------------------
// Usage tracking
// ---------------------------------------------------------------------------

/// One usage event, emitted per resource operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub session: SessionId,
    pub category: TrackingCategory,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Receives usage events.
///
/// Callers treat failures as non-fatal: a returned [`TrackingError`] is
/// logged and dropped, never propagated.
pub trait UsageTracker: Send + Sync {
    fn track(&self, account: &Account, event: &TrackingEvent) -> Result<(), TrackingError>;
}

/// A tracker that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

impl UsageTracker for NoopTracker {
    fn track(&self, _account: &Account, _event: &TrackingEvent) -> Result<(), TrackingError> {
        Ok(())
    }
}
