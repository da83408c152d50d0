//! Usage tracking: one [`TrackingEvent`] per request, plus the `tracing`
//! backed [`LogTracker`].

use std::sync::Arc;

use async_trait::async_trait;
use domain::{
    Account, ApiError, GraphQlRequest, RequestExecutor, SessionId, TrackingError, TrackingEvent,
    UsageTracker,
};
use serde_json::Value;

/// Emits one usage event per request, then delegates.
///
/// Tracker failures are logged at debug level and dropped; they never change
/// the result of the wrapped call.
pub struct TrackingExecutor {
    inner: Arc<dyn RequestExecutor>,
    tracker: Arc<dyn UsageTracker>,
    account: Account,
    session: SessionId,
}

impl TrackingExecutor {
    /// Reports events for `account` under `session`.
    pub fn new(
        inner: Arc<dyn RequestExecutor>,
        tracker: Arc<dyn UsageTracker>,
        account: Account,
        session: SessionId,
    ) -> Self {
        Self {
            inner,
            tracker,
            account,
            session,
        }
    }

    fn event_for(&self, request: &GraphQlRequest) -> TrackingEvent {
        TrackingEvent {
            session: self.session,
            category: request.operation.tracking,
            name: request.operation.tracking_name.to_string(),
            role: request.tracking_role.clone(),
        }
    }
}

#[async_trait]
impl RequestExecutor for TrackingExecutor {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value, ApiError> {
        let event = self.event_for(&request);
        if let Err(err) = self.tracker.track(&self.account, &event) {
            tracing::debug!(
                operation = request.operation.name,
                error = %err,
                "usage tracking failed; continuing"
            );
        }
        self.inner.execute(request).await
    }
}

/// A [`UsageTracker`] that records events as `tracing` events on the
/// `usage` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTracker;

impl UsageTracker for LogTracker {
    fn track(&self, account: &Account, event: &TrackingEvent) -> Result<(), TrackingError> {
        tracing::info!(
            target: "usage",
            session = %event.session,
            server = %account.server_url,
            category = %event.category,
            name = %event.name,
            role = event.role.as_deref().unwrap_or(""),
            "usage"
        );
        Ok(())
    }
}
