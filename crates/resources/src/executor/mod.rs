//! Decorators around a base [`RequestExecutor`](domain::RequestExecutor).
//!
//! [`Connection`](crate::Connection) stacks them as
//! tracking → version gate → (optional) cache → base. Tracking sits outermost
//! so that calls rejected by the gate or served from the cache are still
//! counted.

mod cache;
mod gate;
mod tracking;

pub use cache::{CachingExecutor, FetchPolicy};
pub use gate::VersionGatedExecutor;
pub use tracking::{LogTracker, TrackingExecutor};
