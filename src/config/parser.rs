//! Configuration file parsing (HOCON format).

use std::path::Path;

use hocon::HoconLoader;

use crate::common::error::ConfigError;
use crate::config::types::Config;

/// Load configuration from a HOCON file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    HoconLoader::new()
        .load_file(path)
        .map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

/// Load configuration from a HOCON string.
pub fn load_config_str(content: &str) -> Result<Config, ConfigError> {
    HoconLoader::new()
        .load_str(content)
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?
        .resolve()
        .map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        matrix {
            homeserver = "https://matrix.example.org"
            user = "@op:example.org"
        }
        poll { interval_ms = 1500 }
        networks = [
            {
                name = "ircnet"
                bot_user_id = "@ircnet:irc.snt.utwente.nl"
                provisioning_url = "https://matrix-irc.snt.utwente.nl/ircnet/provision/link"
                remote_server = "irc.snt.utwente.nl"
                nick_pattern = "@_ircnet_(.*):irc\\.snt\\.utwente\\.nl"
            }
        ]
    "#;

    #[test]
    fn test_parse_sample_config() {
        let config = load_config_str(SAMPLE).unwrap();
        assert_eq!(config.matrix.homeserver, "https://matrix.example.org");
        assert_eq!(config.matrix.user, "@op:example.org");
        assert_eq!(config.poll_interval_ms(), 1500);
        assert_eq!(config.networks.len(), 1);

        let net = config.network("ircnet").unwrap();
        assert_eq!(net.bot_user_id, "@ircnet:irc.snt.utwente.nl");
        assert_eq!(net.remote_server, "irc.snt.utwente.nl");
    }

    #[test]
    fn test_poll_interval_default() {
        let config = load_config_str(
            r#"
            matrix { homeserver = "https://m.x", user = "@a:x" }
            networks = []
            "#,
        )
        .unwrap();
        assert_eq!(config.poll_interval_ms(), 2000);
        assert_eq!(config.session_file(), "mxplumb.session");
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(load_config_str("matrix { homeserver").is_err());
    }
}
