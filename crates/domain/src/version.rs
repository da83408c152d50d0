//! Server versions and the version gates attached to catalog operations.
//!
//! Some operations only exist on newer servers, others were removed from
//! newer servers but are kept in the client for backward compatibility. A
//! [`VersionGate`] lets the client reject such a call locally, before any
//! request is sent.

use serde::{Deserialize, Serialize};

use crate::errors::UnsupportedOperationError;

/// The version a server reports in `serverInfo.version`.
///
/// `Dev` builds are treated as newer than every release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServerVersion {
    /// A numbered release.
    Release {
        /// Major component.
        major: u32,
        /// Minor component.
        minor: u32,
        /// Patch component.
        patch: u32,
    },
    /// A development build (`"dev"`).
    Dev,
}

impl ServerVersion {
    /// Creates a release version.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self::Release {
            major,
            minor,
            patch,
        }
    }

    /// Parses a reported version string.
    ///
    /// Accepts `"dev"`, `"2.6.4"`, `"v2.6.4"` and pre-release forms such as
    /// `"2.13.3-alpha.41"` (the suffix is ignored). Missing minor or patch
    /// components default to zero. Returns `None` for anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("dev") {
            return Some(Self::Dev);
        }

        let value = value.strip_prefix('v').unwrap_or(value);
        let core = value.split(['-', '+']).next().unwrap_or_default();
        let mut parts = core.split('.');

        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }

        Some(Self::new(major, minor, patch))
    }

    fn rank(self) -> (u8, u32, u32, u32) {
        match self {
            Self::Release {
                major,
                minor,
                patch,
            } => (0, major, minor, patch),
            Self::Dev => (1, 0, 0, 0),
        }
    }
}

impl PartialOrd for ServerVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServerVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Release {
                major,
                minor,
                patch,
            } => write!(f, "{major}.{minor}.{patch}"),
            Self::Dev => f.write_str("dev"),
        }
    }
}

/// The server release that replaced direct permission grants with invites.
pub const INVITES_VERSION: ServerVersion = ServerVersion::new(2, 6, 4);

/// A compatibility constraint between an operation and the server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionGate {
    /// The operation is rejected on servers at or above `version`.
    RemovedIn {
        /// First server version that no longer supports the operation.
        version: ServerVersion,
        /// What the caller should use instead.
        guidance: &'static str,
    },
    /// The operation is rejected on servers below `version`.
    IntroducedIn {
        /// First server version that supports the operation.
        version: ServerVersion,
        /// What the caller should do on older servers.
        guidance: &'static str,
    },
}

impl VersionGate {
    /// Checks whether `operation` may be sent to a server reporting `server`.
    ///
    /// An unknown server version never blocks a call.
    pub fn check(
        &self,
        operation: &str,
        server: Option<ServerVersion>,
    ) -> Result<(), UnsupportedOperationError> {
        let Some(server) = server else {
            return Ok(());
        };

        let (rejected, guidance) = match *self {
            Self::RemovedIn { version, guidance } => (server >= version, guidance),
            Self::IntroducedIn { version, guidance } => (server < version, guidance),
        };

        if rejected {
            Err(UnsupportedOperationError {
                operation: operation.to_string(),
                server_version: server,
                guidance: guidance.to_string(),
            })
        } else {
            Ok(())
        }
    }
}
