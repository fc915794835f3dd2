//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // Validate homeserver settings
    if config.matrix.homeserver.is_empty() {
        errors.push("matrix.homeserver is required".to_string());
    } else if !config.matrix.homeserver.starts_with("http://")
        && !config.matrix.homeserver.starts_with("https://")
    {
        errors.push(format!(
            "matrix.homeserver must be an http(s) URL (got '{}')",
            config.matrix.homeserver
        ));
    }
    if config.matrix.user.is_empty() {
        errors.push("matrix.user is required".to_string());
    } else if !looks_like_user_id(&config.matrix.user) {
        errors.push(format!(
            "matrix.user must look like @user:server (got '{}')",
            config.matrix.user
        ));
    }

    // Validate network profiles
    if config.networks.is_empty() {
        errors.push("networks is empty - no remote network configured".to_string());
    }
    for (i, net) in config.networks.iter().enumerate() {
        if net.name.is_empty() {
            errors.push(format!("networks[{}].name is required", i));
        }
        if !looks_like_user_id(&net.bot_user_id) {
            errors.push(format!(
                "networks[{}].bot_user_id must look like @bot:server (got '{}')",
                i, net.bot_user_id
            ));
        }
        if !net.provisioning_url.starts_with("http://")
            && !net.provisioning_url.starts_with("https://")
        {
            errors.push(format!(
                "networks[{}].provisioning_url must be an http(s) URL (got '{}')",
                i, net.provisioning_url
            ));
        }
        if net.remote_server.is_empty() {
            errors.push(format!("networks[{}].remote_server is required", i));
        }
        match fancy_regex::Regex::new(&net.nick_pattern) {
            Err(e) => errors.push(format!(
                "networks[{}].nick_pattern is not a valid regex: {}",
                i, e
            )),
            // captures_len counts the implicit whole-match group
            Ok(re) if re.captures_len() != 2 => errors.push(format!(
                "networks[{}].nick_pattern must have exactly one capture group (got {})",
                i,
                re.captures_len() - 1
            )),
            Ok(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

fn looks_like_user_id(id: &str) -> bool {
    id.starts_with('@') && id[1..].contains(':')
}
