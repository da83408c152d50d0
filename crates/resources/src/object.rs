//! Object resource.

use domain::{ApiError, GraphQlRequest, ObjectId, SpeckleObject, StreamId};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::catalog;
use crate::connection::{missing, Connection};

#[derive(Deserialize)]
struct ObjectData {
    stream: Option<StreamObject>,
}

#[derive(Deserialize)]
struct StreamObject {
    object: Option<SpeckleObject>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectCreateData {
    object_create: Option<Vec<ObjectId>>,
}

/// API access for objects.
#[derive(Debug, Clone)]
pub struct ObjectResource {
    conn: Connection,
}

impl ObjectResource {
    /// An object client over `conn`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Fetches one object of a stream by its hash.
    #[instrument(skip(self), fields(stream = %stream_id, object = %object_id))]
    pub async fn get(
        &self,
        stream_id: &StreamId,
        object_id: &ObjectId,
    ) -> Result<SpeckleObject, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::OBJECT_GET,
            json!({ "stream_id": stream_id, "object_id": object_id }),
        );
        let data: ObjectData = self.conn.send(request).await?;
        data.stream.and_then(|s| s.object).ok_or_else(|| missing(&catalog::OBJECT_GET))
    }

    /// Uploads objects to a stream and returns their ids in input order.
    ///
    /// Each object must already be a JSON-serialisable dictionary. This does
    /// not create a commit.
    #[instrument(skip(self, objects), fields(stream = %stream_id, count = objects.len()))]
    pub async fn create(
        &self,
        stream_id: &StreamId,
        objects: Vec<Value>,
    ) -> Result<Vec<ObjectId>, ApiError> {
        let request = GraphQlRequest::new(
            &catalog::OBJECT_CREATE,
            json!({ "object_input": { "streamId": stream_id, "objects": objects } }),
        );
        let data: ObjectCreateData = self.conn.send(request).await?;
        data.object_create
            .ok_or_else(|| missing(&catalog::OBJECT_CREATE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::FetchPolicy;
    use crate::test_support::{sample_account, RecordingTracker, StubExecutor};
    use domain::TrackingCategory;
    use std::sync::Arc;

    fn resource(stub: Arc<StubExecutor>, tracker: Arc<RecordingTracker>) -> ObjectResource {
        ObjectResource::new(Connection::new(
            stub,
            sample_account(),
            None,
            tracker,
            FetchPolicy::AlwaysFresh,
        ))
    }

    #[tokio::test]
    async fn get_unwraps_stream_object() {
        let stub = Arc::new(StubExecutor::new().respond(json!({
            "stream": {
                "id": "s1",
                "name": "Tower",
                "object": {
                    "id": "abc",
                    "speckleType": "Base",
                    "applicationId": null,
                    "createdAt": "2024-01-02T03:04:05Z",
                    "totalChildrenCount": 12,
                    "data": { "speckle_type": "Base", "height": 42 }
                }
            }
        })));
        let tracker = Arc::new(RecordingTracker::default());

        let object = resource(stub.clone(), tracker.clone())
            .get(&StreamId::new("s1").unwrap(), &ObjectId::new("abc").unwrap())
            .await
            .unwrap();

        assert_eq!(object.id.as_str(), "abc");
        assert_eq!(object.total_children_count, Some(12));
        assert_eq!(object.data["height"], 42);
        assert_eq!(
            stub.single_call_variables(),
            json!({ "stream_id": "s1", "object_id": "abc" })
        );
        assert_eq!(tracker.events()[0].category, TrackingCategory::Object);
    }

    #[tokio::test]
    async fn missing_object_is_reported_with_its_path() {
        let stub = Arc::new(StubExecutor::new().respond(json!({
            "stream": { "id": "s1", "name": "Tower", "object": null }
        })));
        let err = resource(stub, Arc::new(RecordingTracker::default()))
            .get(&StreamId::new("s1").unwrap(), &ObjectId::new("zzz").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::MissingData { ref path, .. } if path == "stream.object"
        ));
    }

    #[tokio::test]
    async fn create_wraps_objects_in_input() {
        let stub = Arc::new(StubExecutor::new().respond(json!({ "objectCreate": ["h1", "h2"] })));
        let ids = resource(stub.clone(), Arc::new(RecordingTracker::default()))
            .create(
                &StreamId::new("s1").unwrap(),
                vec![json!({ "a": 1 }), json!({ "b": 2 })],
            )
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert_eq!(ids[1].as_str(), "h2");
        assert_eq!(
            stub.single_call_variables(),
            json!({ "object_input": { "streamId": "s1", "objects": [{ "a": 1 }, { "b": 2 }] } })
        );
    }
}
