//! Stubs shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use domain::{
    Account, ApiError, AuthToken, GraphQlRequest, Operation, RequestExecutor, ServerUrl,
    ServiceError, TrackingError, TrackingEvent, UsageTracker,
};
use serde_json::Value;

/// A [`RequestExecutor`] that answers from canned data and records every call.
#[derive(Default)]
pub struct StubExecutor {
    by_operation: HashMap<&'static str, Value>,
    fallback: Option<Result<Value, ServiceError>>,
    calls: Mutex<Vec<GraphQlRequest>>,
}

impl StubExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every operation without a specific response with `data`.
    pub fn respond(mut self, data: Value) -> Self {
        self.fallback = Some(Ok(data));
        self
    }

    /// Answers `operation` with `data`.
    pub fn respond_to(mut self, operation: &'static Operation, data: Value) -> Self {
        self.by_operation.insert(operation.name, data);
        self
    }

    /// Fails every operation without a specific response with a GraphQL error.
    pub fn fail_with_graphql(mut self, message: &str) -> Self {
        self.fallback = Some(Err(ServiceError::GraphQl {
            operation: String::new(),
            messages: vec![message.to_string()],
        }));
        self
    }

    pub fn calls(&self) -> Vec<GraphQlRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Variables of the only recorded call.
    pub fn single_call_variables(&self) -> Value {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one call");
        Value::Object(calls[0].variables.clone())
    }
}

#[async_trait]
impl RequestExecutor for StubExecutor {
    async fn execute(&self, request: GraphQlRequest) -> Result<Value, ApiError> {
        let name = request.operation.name;
        self.calls.lock().unwrap().push(request);

        if let Some(data) = self.by_operation.get(name) {
            return Ok(data.clone());
        }
        match &self.fallback {
            Some(Ok(data)) => Ok(data.clone()),
            Some(Err(err)) => Err(err.clone().into()),
            None => panic!("no stub response for {name}"),
        }
    }
}

/// Records every event it receives.
#[derive(Default)]
pub struct RecordingTracker {
    events: Mutex<Vec<TrackingEvent>>,
}

impl RecordingTracker {
    pub fn events(&self) -> Vec<TrackingEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl UsageTracker for RecordingTracker {
    fn track(&self, _account: &Account, event: &TrackingEvent) -> Result<(), TrackingError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Fails on every event.
pub struct FailingTracker;

impl UsageTracker for FailingTracker {
    fn track(&self, _account: &Account, _event: &TrackingEvent) -> Result<(), TrackingError> {
        Err(TrackingError("telemetry endpoint unreachable".into()))
    }
}

pub fn sample_account() -> Account {
    Account::unauthenticated(
        ServerUrl::parse("speckle.example.com").unwrap(),
        AuthToken::new("token-123").unwrap(),
    )
}
