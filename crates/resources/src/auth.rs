//! Turning a token into an authenticated [`Connection`].

use std::sync::Arc;

use domain::{Account, ApiError, RequestExecutor, ServerVersion, UsageTracker};

use crate::connection::Connection;
use crate::executor::FetchPolicy;
use crate::server::{parse_reported_version, ActiveUserResource, ServerResource};

/// Checks `account`'s token against its server.
///
/// Fetches `serverInfo` and `activeUser` over an ungated bootstrap connection
/// and returns the account with both filled in, plus the parsed
/// server version (`None` when unrecognised).
pub async fn authenticate(
    base: Arc<dyn RequestExecutor>,
    account: Account,
    tracker: Arc<dyn UsageTracker>,
) -> Result<(Account, Option<ServerVersion>), ApiError> {
    let bootstrap = Connection::new(
        base,
        account.clone(),
        None,
        tracker,
        FetchPolicy::AlwaysFresh,
    );

    let server = ServerResource::new(bootstrap.clone()).info().await?;
    let user = ActiveUserResource::new(bootstrap).get().await?;
    let version = parse_reported_version(&server);

    tracing::info!(
        server = %account.server_url,
        server_version = ?version,
        user = %user.id,
        "authenticated"
    );

    let account = Account {
        user: Some(user),
        server: Some(server),
        ..account
    };
    Ok((account, version))
}

/// [`authenticate`]s and returns a ready connection with the full executor
/// stack over `base`.
pub async fn establish(
    base: Arc<dyn RequestExecutor>,
    account: Account,
    tracker: Arc<dyn UsageTracker>,
    policy: FetchPolicy,
) -> Result<Connection, ApiError> {
    let (account, version) = authenticate(base.clone(), account, tracker.clone()).await?;
    Ok(Connection::new(base, account, version, tracker, policy))
}
