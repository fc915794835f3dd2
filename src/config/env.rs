//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `MXPLUMB_HOMESERVER` - homeserver base URL
//! - `MXPLUMB_USER` - full Matrix user id
//! - `MXPLUMB_ACCESS_TOKEN` - access token (skips interactive login)
//! - `MXPLUMB_PASSWORD` - password for a non-interactive login
//! - `MXPLUMB_SESSION_FILE` - session store path

use std::env;

use crate::config::types::Config;

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "MXPLUMB";

/// Apply environment variable overrides to a config.
///
/// This allows the access token to be provided via the environment
/// instead of the config file or session store.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(homeserver) = env::var(format!("{}_HOMESERVER", ENV_PREFIX)) {
        config.matrix.homeserver = homeserver;
    }
    if let Ok(user) = env::var(format!("{}_USER", ENV_PREFIX)) {
        config.matrix.user = user;
    }
    if let Ok(token) = env::var(format!("{}_ACCESS_TOKEN", ENV_PREFIX)) {
        if !token.is_empty() {
            config.matrix.access_token = Some(token);
        }
    }
    if let Ok(password) = env::var(format!("{}_PASSWORD", ENV_PREFIX)) {
        if !password.is_empty() {
            config.matrix.password = Some(password);
        }
    }
    if let Ok(path) = env::var(format!("{}_SESSION_FILE", ENV_PREFIX)) {
        config.matrix.session_file = Some(path);
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `MXPLUMB_CONFIG`, otherwise returns "mxplumb.conf".
pub fn get_config_path() -> String {
    env::var(format!("{}_CONFIG", ENV_PREFIX)).unwrap_or_else(|_| "mxplumb.conf".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_test_config() -> Config {
        Config {
            matrix: MatrixConfig {
                homeserver: "https://original.example.org".to_string(),
                user: "@original:example.org".to_string(),
                access_token: None,
                password: None,
                session_file: None,
            },
            networks: Vec::new(),
            poll: None,
        }
    }

    #[test]
    fn test_get_config_path_default() {
        env::remove_var("MXPLUMB_CONFIG");
        assert_eq!(get_config_path(), "mxplumb.conf");
    }

    #[test]
    fn test_apply_env_overrides_no_vars() {
        env::remove_var("MXPLUMB_HOMESERVER");
        env::remove_var("MXPLUMB_USER");
        env::remove_var("MXPLUMB_ACCESS_TOKEN");
        env::remove_var("MXPLUMB_SESSION_FILE");

        let result = apply_env_overrides(make_test_config());

        assert_eq!(result.matrix.homeserver, "https://original.example.org");
        assert_eq!(result.matrix.user, "@original:example.org");
        assert!(result.matrix.access_token.is_none());
    }

    #[test]
    fn test_password_override() {
        env::set_var("MXPLUMB_PASSWORD", "hunter2");
        let result = apply_env_overrides(make_test_config());
        assert_eq!(result.matrix.password.as_deref(), Some("hunter2"));

        // An empty value must not enable a non-interactive login.
        env::set_var("MXPLUMB_PASSWORD", "");
        let result = apply_env_overrides(make_test_config());
        assert!(result.matrix.password.is_none());

        env::remove_var("MXPLUMB_PASSWORD");
    }
}
