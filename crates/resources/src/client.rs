//! The aggregate client handed to callers once a connection is established.

use crate::{
    ActiveUserResource, BranchResource, CommitResource, Connection, ObjectResource,
    ServerResource, StreamResource,
};

/// Every resource client over one shared [`Connection`].
#[derive(Debug, Clone)]
pub struct Client {
    pub active_user: ActiveUserResource,
    pub server: ServerResource,
    pub stream: StreamResource,
    pub object: ObjectResource,
    pub branch: BranchResource,
    pub commit: CommitResource,
    connection: Connection,
}

impl Client {
    /// Builds every resource client over clones of `connection`.
    pub fn new(connection: Connection) -> Self {
        Self {
            active_user: ActiveUserResource::new(connection.clone()),
            server: ServerResource::new(connection.clone()),
            stream: StreamResource::new(connection.clone()),
            object: ObjectResource::new(connection.clone()),
            branch: BranchResource::new(connection.clone()),
            commit: CommitResource::new(connection.clone()),
            connection,
        }
    }

    /// The connection shared by every resource client.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}
