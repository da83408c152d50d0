//! Core domain for the stream activity client.
//!
//! This crate contains every domain model, newtype identifier, server version
//! rule, and error type used throughout the workspace, plus the port traits
//! infrastructure crates implement. It never performs I/O.
//!
//! ## Architectural Layer
//!
//! **Business types + port definitions.** The `resources` crate drives the
//! ports defined here; the `transport` crate supplies the HTTP implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`StreamId`, `CommitId`, `ServerUrl`, etc.) |
//! | [`models`] | Decoded server records (`Stream`, `Branch`, `Commit`, etc.) |
//! | [`version`] | `ServerVersion` and the `VersionGate` compatibility rule |
//! | [`errors`] | `ApiError`, `ServiceError`, `UnsupportedOperationError` |
//! | [`ports`] | `RequestExecutor`, `UsageTracker`, `Operation` descriptors |

pub mod errors;
pub mod identifiers;
pub mod models;
pub mod ports;
pub mod version;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ApiError, ServiceError, TrackingError, UnsupportedOperationError};
pub use identifiers::{
    AuthToken, BranchId, CommitId, InviteId, ObjectId, ServerUrl, SessionId, StreamId, UserId,
};
pub use models::{
    Account, Branch, Collaborator, Commit, LimitedUser, Page, PendingStreamCollaborator,
    ServerInfo, ServerRole, SpeckleObject, Stream, Timestamp, User,
};
pub use ports::{
    GraphQlRequest, NoopTracker, Operation, OperationKind, RequestExecutor, TrackingCategory,
    TrackingEvent, UsageTracker,
};
pub use version::{ServerVersion, VersionGate, INVITES_VERSION};
