//! The query catalog: one static [`Operation`] per remote action.
//!
//! Entries are pure data. The variable names listed in each entry are the
//! ones the resource clients bind; the response path is where the payload
//! sits below `data`.

use domain::{Operation, OperationKind, TrackingCategory, VersionGate, INVITES_VERSION};

const GRANT_GUIDANCE: &str = "Direct permission grants were removed in server v2.6.4. Use \
     `update_permission` to change an existing collaborator's role or `invite` to add a user.";

const INVITE_GUIDANCE: &str = "Stream invites require server v2.6.4 or later. Upgrade the \
     server or use `grant_permission`.";

const PERMISSION_UPDATE_GUIDANCE: &str = "`update_permission` requires server v2.6.4 or \
     later. Use `grant_permission` on older servers.";

const REMOVED_IN_INVITES: VersionGate = VersionGate::RemovedIn {
    version: INVITES_VERSION,
    guidance: GRANT_GUIDANCE,
};

const INTRODUCED_WITH_INVITES: VersionGate = VersionGate::IntroducedIn {
    version: INVITES_VERSION,
    guidance: INVITE_GUIDANCE,
};

// ---------------------------------------------------------------------------
// Server and user
// ---------------------------------------------------------------------------

pub static SERVER_INFO: Operation = Operation {
    name: "ServerInfo",
    kind: OperationKind::Query,
    document: r#"
query ServerInfo {
  serverInfo {
    name
    company
    description
    adminContact
    canonicalUrl
    version
    roles { name description resourceTarget }
  }
}"#,
    variables: &[],
    response_path: &["serverInfo"],
    gate: None,
    tracking: TrackingCategory::Sdk,
    tracking_name: "server info",
};

pub static ACTIVE_USER: Operation = Operation {
    name: "ActiveUser",
    kind: OperationKind::Query,
    document: r#"
query ActiveUser {
  activeUser {
    id
    email
    name
    bio
    company
    avatar
    verified
    role
  }
}"#,
    variables: &[],
    response_path: &["activeUser"],
    gate: None,
    tracking: TrackingCategory::Sdk,
    tracking_name: "active user",
};

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

pub static OBJECT_GET: Operation = Operation {
    name: "Object",
    kind: OperationKind::Query,
    document: r#"
query Object($stream_id: String!, $object_id: String!) {
  stream(id: $stream_id) {
    id
    name
    object(id: $object_id) {
      id
      speckleType
      applicationId
      createdAt
      totalChildrenCount
      data
    }
  }
}"#,
    variables: &["stream_id", "object_id"],
    response_path: &["stream", "object"],
    gate: None,
    tracking: TrackingCategory::Object,
    tracking_name: "get",
};

pub static OBJECT_CREATE: Operation = Operation {
    name: "ObjectCreate",
    kind: OperationKind::Mutation,
    document: r#"
mutation ObjectCreate($object_input: ObjectCreateInput!) {
  objectCreate(objectInput: $object_input)
}"#,
    variables: &["object_input"],
    response_path: &["objectCreate"],
    gate: None,
    tracking: TrackingCategory::Object,
    tracking_name: "create",
};

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

pub static STREAM_GET: Operation = Operation {
    name: "Stream",
    kind: OperationKind::Query,
    document: r#"
query Stream($id: String!, $branch_limit: Int!, $commit_limit: Int!) {
  stream(id: $id) {
    id
    name
    role
    description
    isPublic
    createdAt
    updatedAt
    commentCount
    favoritesCount
    collaborators { id name role avatar }
    branches(limit: $branch_limit) {
      totalCount
      cursor
      items {
        id
        name
        description
        commits(limit: $commit_limit) {
          totalCount
          cursor
          items {
            id
            referencedObject
            message
            authorName
            authorId
            authorAvatar
            branchName
            createdAt
            sourceApplication
            totalChildrenCount
            parents
          }
        }
      }
    }
  }
}"#,
    variables: &["id", "branch_limit", "commit_limit"],
    response_path: &["stream"],
    gate: None,
    tracking: TrackingCategory::Stream,
    tracking_name: "get",
};

pub static STREAM_LIST: Operation = Operation {
    name: "StreamList",
    kind: OperationKind::Query,
    document: r#"
query StreamList($stream_limit: Int!) {
  activeUser {
    id
    streams(limit: $stream_limit) {
      totalCount
      cursor
      items {
        id
        name
        role
        isPublic
        createdAt
        updatedAt
        description
        commentCount
        favoritesCount
        collaborators { id name role avatar }
      }
    }
  }
}"#,
    variables: &["stream_limit"],
    response_path: &["activeUser", "streams", "items"],
    gate: None,
    tracking: TrackingCategory::Stream,
    tracking_name: "list",
};

pub static STREAM_CREATE: Operation = Operation {
    name: "StreamCreate",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamCreate($stream: StreamCreateInput!) {
  streamCreate(stream: $stream)
}"#,
    variables: &["stream"],
    response_path: &["streamCreate"],
    gate: None,
    tracking: TrackingCategory::Stream,
    tracking_name: "create",
};

pub static STREAM_UPDATE: Operation = Operation {
    name: "StreamUpdate",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamUpdate($stream: StreamUpdateInput!) {
  streamUpdate(stream: $stream)
}"#,
    variables: &["stream"],
    response_path: &["streamUpdate"],
    gate: None,
    tracking: TrackingCategory::Stream,
    tracking_name: "update",
};

pub static STREAM_DELETE: Operation = Operation {
    name: "StreamDelete",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamDelete($id: String!) {
  streamDelete(id: $id)
}"#,
    variables: &["id"],
    response_path: &["streamDelete"],
    gate: None,
    tracking: TrackingCategory::Stream,
    tracking_name: "delete",
};

pub static STREAM_SEARCH: Operation = Operation {
    name: "StreamSearch",
    kind: OperationKind::Query,
    document: r#"
query StreamSearch($search_query: String!, $limit: Int!, $branch_limit: Int!, $commit_limit: Int!) {
  streams(query: $search_query, limit: $limit) {
    totalCount
    cursor
    items {
      id
      name
      role
      description
      isPublic
      createdAt
      updatedAt
      collaborators { id name role avatar }
      branches(limit: $branch_limit) {
        totalCount
        cursor
        items {
          id
          name
          description
          commits(limit: $commit_limit) {
            totalCount
            cursor
            items {
              id
              referencedObject
              message
              authorName
              authorId
              authorAvatar
              branchName
              createdAt
              sourceApplication
              totalChildrenCount
              parents
            }
          }
        }
      }
    }
  }
}"#,
    variables: &["search_query", "limit", "branch_limit", "commit_limit"],
    response_path: &["streams", "items"],
    gate: None,
    tracking: TrackingCategory::Stream,
    tracking_name: "search",
};

pub static STREAM_FAVORITE: Operation = Operation {
    name: "StreamFavorite",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamFavorite($stream_id: String!, $favorited: Boolean!) {
  streamFavorite(streamId: $stream_id, favorited: $favorited) {
    id
    name
    favoritedDate
    favoritesCount
  }
}"#,
    variables: &["stream_id", "favorited"],
    response_path: &["streamFavorite"],
    gate: None,
    tracking: TrackingCategory::Stream,
    tracking_name: "favorite",
};

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

pub static STREAM_GRANT_PERMISSION: Operation = Operation {
    name: "StreamGrantPermission",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamGrantPermission($permission_params: StreamGrantPermissionInput!) {
  streamGrantPermission(permissionParams: $permission_params)
}"#,
    variables: &["permission_params"],
    response_path: &["streamGrantPermission"],
    gate: Some(REMOVED_IN_INVITES),
    tracking: TrackingCategory::Permission,
    tracking_name: "add",
};

pub static STREAM_UPDATE_PERMISSION: Operation = Operation {
    name: "StreamUpdatePermission",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamUpdatePermission($permission_params: StreamUpdatePermissionInput!) {
  streamUpdatePermission(permissionParams: $permission_params)
}"#,
    variables: &["permission_params"],
    response_path: &["streamUpdatePermission"],
    gate: Some(VersionGate::IntroducedIn {
        version: INVITES_VERSION,
        guidance: PERMISSION_UPDATE_GUIDANCE,
    }),
    tracking: TrackingCategory::Permission,
    tracking_name: "update",
};

pub static STREAM_REVOKE_PERMISSION: Operation = Operation {
    name: "StreamRevokePermission",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamRevokePermission($permission_params: StreamRevokePermissionInput!) {
  streamRevokePermission(permissionParams: $permission_params)
}"#,
    variables: &["permission_params"],
    response_path: &["streamRevokePermission"],
    gate: None,
    tracking: TrackingCategory::Permission,
    tracking_name: "revoke",
};

// ---------------------------------------------------------------------------
// Invites
// ---------------------------------------------------------------------------

pub static STREAM_INVITES: Operation = Operation {
    name: "StreamInvites",
    kind: OperationKind::Query,
    document: r#"
query StreamInvites($stream_id: String!) {
  stream(id: $stream_id) {
    id
    pendingCollaborators {
      id
      inviteId
      streamId
      streamName
      title
      role
      token
      invitedBy { id name company avatar }
      user { id name company avatar }
    }
  }
}"#,
    variables: &["stream_id"],
    response_path: &["stream", "pendingCollaborators"],
    gate: Some(INTRODUCED_WITH_INVITES),
    tracking: TrackingCategory::Invite,
    tracking_name: "get",
};

pub static STREAM_INVITE_CREATE: Operation = Operation {
    name: "StreamInviteCreate",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamInviteCreate($input: StreamInviteCreateInput!) {
  streamInviteCreate(input: $input)
}"#,
    variables: &["input"],
    response_path: &["streamInviteCreate"],
    gate: Some(INTRODUCED_WITH_INVITES),
    tracking: TrackingCategory::Invite,
    tracking_name: "create",
};

pub static STREAM_INVITE_BATCH_CREATE: Operation = Operation {
    name: "StreamInviteBatchCreate",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamInviteBatchCreate($input: [StreamInviteCreateInput!]!) {
  streamInviteBatchCreate(input: $input)
}"#,
    variables: &["input"],
    response_path: &["streamInviteBatchCreate"],
    gate: Some(INTRODUCED_WITH_INVITES),
    tracking: TrackingCategory::Invite,
    tracking_name: "batch create",
};

pub static STREAM_INVITE_CANCEL: Operation = Operation {
    name: "StreamInviteCancel",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamInviteCancel($stream_id: String!, $invite_id: String!) {
  streamInviteCancel(streamId: $stream_id, inviteId: $invite_id)
}"#,
    variables: &["stream_id", "invite_id"],
    response_path: &["streamInviteCancel"],
    gate: Some(INTRODUCED_WITH_INVITES),
    tracking: TrackingCategory::Invite,
    tracking_name: "cancel",
};

pub static STREAM_INVITE_USE: Operation = Operation {
    name: "StreamInviteUse",
    kind: OperationKind::Mutation,
    document: r#"
mutation StreamInviteUse($accept: Boolean!, $stream_id: String!, $token: String!) {
  streamInviteUse(accept: $accept, streamId: $stream_id, token: $token)
}"#,
    variables: &["accept", "stream_id", "token"],
    response_path: &["streamInviteUse"],
    gate: Some(INTRODUCED_WITH_INVITES),
    tracking: TrackingCategory::Invite,
    tracking_name: "use",
};

// ---------------------------------------------------------------------------
// Branches and commits
// ---------------------------------------------------------------------------

pub static BRANCH_LIST: Operation = Operation {
    name: "BranchList",
    kind: OperationKind::Query,
    document: r#"
query BranchList($stream_id: String!, $branches_limit: Int!, $commits_limit: Int!) {
  stream(id: $stream_id) {
    id
    branches(limit: $branches_limit) {
      totalCount
      cursor
      items {
        id
        name
        description
        commits(limit: $commits_limit) {
          totalCount
          cursor
          items {
            id
            referencedObject
            message
            authorName
            authorId
            authorAvatar
            branchName
            createdAt
            sourceApplication
            totalChildrenCount
            parents
          }
        }
      }
    }
  }
}"#,
    variables: &["stream_id", "branches_limit", "commits_limit"],
    response_path: &["stream", "branches", "items"],
    gate: None,
    tracking: TrackingCategory::Branch,
    tracking_name: "list",
};

pub static BRANCH_GET: Operation = Operation {
    name: "BranchGet",
    kind: OperationKind::Query,
    document: r#"
query BranchGet($stream_id: String!, $name: String!, $commits_limit: Int!) {
  stream(id: $stream_id) {
    id
    branch(name: $name) {
      id
      name
      description
      commits(limit: $commits_limit) {
        totalCount
        cursor
        items {
          id
          referencedObject
          message
          authorName
          authorId
          authorAvatar
          branchName
          createdAt
          sourceApplication
          totalChildrenCount
          parents
        }
      }
    }
  }
}"#,
    variables: &["stream_id", "name", "commits_limit"],
    response_path: &["stream", "branch"],
    gate: None,
    tracking: TrackingCategory::Branch,
    tracking_name: "get",
};

pub static COMMIT_LIST: Operation = Operation {
    name: "CommitList",
    kind: OperationKind::Query,
    document: r#"
query CommitList($stream_id: String!, $limit: Int!) {
  stream(id: $stream_id) {
    id
    commits(limit: $limit) {
      totalCount
      cursor
      items {
        id
        referencedObject
        message
        authorName
        authorId
        authorAvatar
        branchName
        createdAt
        sourceApplication
        totalChildrenCount
        parents
      }
    }
  }
}"#,
    variables: &["stream_id", "limit"],
    response_path: &["stream", "commits", "items"],
    gate: None,
    tracking: TrackingCategory::Commit,
    tracking_name: "list",
};

pub static COMMIT_GET: Operation = Operation {
    name: "CommitGet",
    kind: OperationKind::Query,
    document: r#"
query CommitGet($stream_id: String!, $commit_id: String!) {
  stream(id: $stream_id) {
    id
    commit(id: $commit_id) {
      id
      referencedObject
      message
      authorName
      authorId
      authorAvatar
      branchName
      createdAt
      sourceApplication
      totalChildrenCount
      parents
    }
  }
}"#,
    variables: &["stream_id", "commit_id"],
    response_path: &["stream", "commit"],
    gate: None,
    tracking: TrackingCategory::Commit,
    tracking_name: "get",
};

/// Every catalog entry, in declaration order.
pub static ALL: &[&Operation] = &[
    &SERVER_INFO,
    &ACTIVE_USER,
    &OBJECT_GET,
    &OBJECT_CREATE,
    &STREAM_GET,
    &STREAM_LIST,
    &STREAM_CREATE,
    &STREAM_UPDATE,
    &STREAM_DELETE,
    &STREAM_SEARCH,
    &STREAM_FAVORITE,
    &STREAM_GRANT_PERMISSION,
    &STREAM_UPDATE_PERMISSION,
    &STREAM_REVOKE_PERMISSION,
    &STREAM_INVITES,
    &STREAM_INVITE_CREATE,
    &STREAM_INVITE_BATCH_CREATE,
    &STREAM_INVITE_CANCEL,
    &STREAM_INVITE_USE,
    &BRANCH_LIST,
    &BRANCH_GET,
    &COMMIT_LIST,
    &COMMIT_GET,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn operation_names_are_unique() {
        let names: HashSet<_> = ALL.iter().map(|op| op.name).collect();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn document_names_its_operation() {
        for op in ALL {
            let keyword = match op.kind {
                OperationKind::Query => "query",
                OperationKind::Mutation => "mutation",
            };
            let header = format!("{keyword} {}", op.name);
            assert!(
                op.document.contains(&header),
                "{} does not declare `{header}`",
                op.name
            );
        }
    }

    #[test]
    fn every_declared_variable_appears_in_the_document() {
        for op in ALL {
            for var in op.variables {
                assert!(
                    op.document.contains(&format!("${var}:")),
                    "{} is missing ${var}",
                    op.name
                );
            }
        }
    }

    #[test]
    fn response_path_starts_with_a_selected_field() {
        for op in ALL {
            let root = op.response_path[0];
            assert!(op.document.contains(root), "{} never selects {root}", op.name);
        }
    }

    #[test]
    fn only_permission_and_invite_operations_are_gated() {
        for op in ALL {
            if op.gate.is_some() {
                assert!(matches!(
                    op.tracking,
                    TrackingCategory::Permission | TrackingCategory::Invite
                ));
            }
        }
        assert!(matches!(
            STREAM_GRANT_PERMISSION.gate,
            Some(VersionGate::RemovedIn { .. })
        ));
        assert!(STREAM_REVOKE_PERMISSION.gate.is_none());
    }
}
