//! Resource clients for the stream activity server API.
//!
//! Each resource ([`StreamResource`], [`ObjectResource`], [`BranchResource`],
//! [`CommitResource`], [`ServerResource`], [`ActiveUserResource`]) binds
//! typed inputs to an entry of the [`catalog`], sends it through a
//! [`Connection`], and decodes the operation's typed response envelope.
//!
//! ## Architectural Layer
//!
//! **Orchestration.** Resources sequence calls between the domain types in
//! [`domain`] and whatever [`domain::RequestExecutor`] the connection wraps.
//! They validate presence only; the server decides legality.
//!
//! ## Executor stack
//!
//! [`Connection::new`] composes the base executor with:
//!
//! 1. [`executor::TrackingExecutor`]: one usage event per call; tracker
//!    failures are swallowed.
//! 2. [`executor::VersionGatedExecutor`]: rejects gated operations locally
//!    with [`domain::ApiError::UnsupportedOperation`].
//! 3. [`executor::CachingExecutor`]: only under
//!    [`FetchPolicy::ReuseWithinRun`].

pub mod auth;
pub mod catalog;
pub mod executor;

mod branch;
mod client;
mod commit;
mod connection;
mod object;
mod server;
mod stream;

#[cfg(test)]
mod test_support;

pub use branch::BranchResource;
pub use client::Client;
pub use commit::CommitResource;
pub use connection::Connection;
pub use executor::{FetchPolicy, LogTracker};
pub use object::ObjectResource;
pub use server::{ActiveUserResource, ServerResource};
pub use stream::{
    select_stream, NestedLimits, NewStream, SearchOptions, StreamInvite, StreamResource,
    StreamUpdate, DEFAULT_INVITE_ROLE,
};
