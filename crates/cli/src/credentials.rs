//! Local account store and credential resolution.
//!
//! The store is a JSON array of [`Account`] records (camelCase, as the
//! domain model serialises them), kept at
//! `<data dir>/stream-activity/accounts.json` unless configured otherwise.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use domain::{Account, AuthToken, ServerUrl};

use crate::config::APP_DIR;

/// Server used with a bare token when none is configured.
pub const DEFAULT_SERVER: &str = "speckle.xyz";

/// `<data dir>/stream-activity/accounts.json`, if the platform has a data dir.
pub fn default_accounts_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join("accounts.json"))
}

/// Reads every account in the store. A missing file is an empty store.
pub fn load_local_accounts(path: &Path) -> Result<Vec<Account>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no local account store");
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read account store {}", path.display()))?;
    let accounts: Vec<Account> = serde_json::from_str(&contents)
        .with_context(|| format!("invalid account store {}", path.display()))?;

    tracing::debug!(path = %path.display(), count = accounts.len(), "loaded local accounts");
    Ok(accounts)
}

/// The account flagged as default, else the first one (which is then marked
/// as the default). `None` for an empty store.
pub fn default_account(accounts: Vec<Account>) -> Option<Account> {
    let index = accounts.iter().position(|a| a.is_default).unwrap_or(0);
    let mut account = accounts.into_iter().nth(index)?;
    account.is_default = true;
    Some(account)
}

/// The first stored account for `server`.
pub fn account_for_server(accounts: &[Account], server: &ServerUrl) -> Option<Account> {
    accounts.iter().find(|a| &a.server_url == server).cloned()
}

/// Picks the account to authenticate with.
///
/// 1. A token: the stored account holding that token, else a new account on
///    `server` (or [`DEFAULT_SERVER`]).
/// 2. A server without a token: the stored account for that server.
/// 3. Neither: the store's default account.
pub fn resolve_account(
    server: Option<&str>,
    token: Option<&str>,
    local: Vec<Account>,
) -> Result<Account> {
    let server = server
        .map(|raw| ServerUrl::parse(raw).ok_or_else(|| anyhow!("invalid server URL `{raw}`")))
        .transpose()?;

    if let Some(raw) = token {
        let token = AuthToken::new(raw).ok_or_else(|| anyhow!("the token is blank"))?;
        if let Some(stored) = local
            .iter()
            .find(|a| a.token == token && server.as_ref().map_or(true, |s| &a.server_url == s))
        {
            return Ok(stored.clone());
        }

        let server_url = match server {
            Some(url) => url,
            None => ServerUrl::parse(DEFAULT_SERVER)
                .ok_or_else(|| anyhow!("invalid default server URL"))?,
        };
        return Ok(Account::unauthenticated(server_url, token));
    }

    if let Some(server) = server {
        return account_for_server(&local, &server).ok_or_else(|| {
            anyhow!("no stored account for {server}; pass --token or add one to the account store")
        });
    }

    match default_account(local) {
        Some(account) => Ok(account),
        None => bail!(
            "no credentials: pass --token (or set SPECKLE_TOKEN) or add an account to the local account store"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(server: &str, token: &str, is_default: bool) -> Account {
        Account {
            is_default,
            ..Account::unauthenticated(
                ServerUrl::parse(server).unwrap(),
                AuthToken::new(token).unwrap(),
            )
        }
    }

    #[test]
    fn missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let accounts = load_local_accounts(&dir.path().join("accounts.json")).unwrap();
        assert!(accounts.is_empty());
    }

    #[test]
    fn store_is_read_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        std::fs::write(
            &path,
            r#"[
                { "serverUrl": "https://speckle.example.com", "token": "t1" },
                { "serverUrl": "macad.speckle.xyz", "token": "t2", "isDefault": true }
            ]"#,
        )
        .unwrap();

        let accounts = load_local_accounts(&path).unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[1].server_url.as_str(), "https://macad.speckle.xyz");
        assert!(accounts[1].is_default);
    }

    #[test]
    fn corrupt_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(load_local_accounts(&path).is_err());
    }

    #[test]
    fn flagged_account_is_default() {
        let accounts = vec![
            account("a.example.com", "t1", false),
            account("b.example.com", "t2", true),
        ];
        let chosen = default_account(accounts).unwrap();
        assert_eq!(chosen.token.expose(), "t2");
    }

    #[test]
    fn first_account_becomes_default_when_none_flagged() {
        let accounts = vec![
            account("a.example.com", "t1", false),
            account("b.example.com", "t2", false),
        ];
        let chosen = default_account(accounts).unwrap();
        assert_eq!(chosen.token.expose(), "t1");
        assert!(chosen.is_default);
        assert!(default_account(Vec::new()).is_none());
    }

    #[test]
    fn token_reuses_stored_account() {
        let local = vec![account("macad.speckle.xyz", "t1", false)];
        let resolved = resolve_account(None, Some("t1"), local).unwrap();
        assert_eq!(resolved.server_url.as_str(), "https://macad.speckle.xyz");
    }

    #[test]
    fn unknown_token_creates_account_on_given_server() {
        let resolved =
            resolve_account(Some("macad.speckle.xyz/"), Some(" t9 "), Vec::new()).unwrap();
        assert_eq!(resolved.server_url.as_str(), "https://macad.speckle.xyz");
        assert_eq!(resolved.token.expose(), "t9");
        assert!(resolved.user.is_none());
    }

    #[test]
    fn bare_token_uses_default_server() {
        let resolved = resolve_account(None, Some("t9"), Vec::new()).unwrap();
        assert_eq!(resolved.server_url.as_str(), "https://speckle.xyz");
    }

    #[test]
    fn server_without_token_needs_stored_account() {
        let local = vec![account("a.example.com", "t1", true)];
        let resolved = resolve_account(Some("a.example.com"), None, local.clone()).unwrap();
        assert_eq!(resolved.token.expose(), "t1");
        assert!(resolve_account(Some("b.example.com"), None, local).is_err());
    }

    #[test]
    fn nothing_configured_is_an_error() {
        let err = resolve_account(None, None, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("no credentials"));
    }
}
