//! Configuration type definitions.

use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub matrix: MatrixConfig,
    pub networks: Vec<NetworkProfile>,
    pub poll: Option<PollConfig>,
}

/// Homeserver connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixConfig {
    /// Homeserver base URL, e.g. `https://matrix.org`.
    pub homeserver: String,
    /// Full user id, e.g. `@operator:matrix.org`.
    pub user: String,
    /// Cached access token; normally left empty and restored from the
    /// session file or `MXPLUMB_ACCESS_TOKEN`.
    pub access_token: Option<String>,
    /// Password for a non-interactive login; normally supplied via
    /// `MXPLUMB_PASSWORD` rather than the config file.
    #[serde(default)]
    pub password: Option<String>,
    /// Path of the persisted session store.
    pub session_file: Option<String>,
}

/// Membership polling settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    pub interval_ms: Option<u64>,
}

/// Static descriptor of one remote network.
///
/// Immutable after startup; exactly one profile is active per bridging
/// operation, looked up by name.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkProfile {
    /// Short name shown in the menu, e.g. `ircnet`.
    pub name: String,
    /// Matrix identity of the network's bridge agent.
    pub bot_user_id: String,
    /// Provisioning service endpoint for link requests.
    pub provisioning_url: String,
    /// Remote server hostname passed through to the provisioning service.
    pub remote_server: String,
    /// Regex with exactly one capture group mapping a bridged-in Matrix id
    /// to its remote nickname.
    pub nick_pattern: String,
}

impl Config {
    /// Poll interval for membership waits; defaults to 2000ms.
    pub fn poll_interval_ms(&self) -> u64 {
        self.poll
            .as_ref()
            .and_then(|p| p.interval_ms)
            .unwrap_or(2000)
    }

    /// Session store path; defaults to `mxplumb.session`.
    pub fn session_file(&self) -> String {
        self.matrix
            .session_file
            .clone()
            .unwrap_or_else(|| "mxplumb.session".to_string())
    }

    pub fn network(&self, name: &str) -> Option<&NetworkProfile> {
        self.networks.iter().find(|n| n.name == name)
    }
}
