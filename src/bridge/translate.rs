//! Identity translation.
//!
//! Maps a bridged-in Matrix identity to its remote-network nickname via the
//! profile's pattern rule. A miss is the ordinary outcome for users who are
//! not bridged-in remote users, so it is an `Option`, not an error.

use fancy_regex::Regex;
use tracing::debug;

use crate::config::types::NetworkProfile;

/// Compiled identity pattern rule for one network.
pub struct NickMatcher {
    pattern: Regex,
}

impl NickMatcher {
    /// Compile the profile's pattern. Config validation has already checked
    /// that it compiles and carries exactly one capture group.
    pub fn for_profile(profile: &NetworkProfile) -> Result<Self, fancy_regex::Error> {
        Ok(Self {
            pattern: Regex::new(&profile.nick_pattern)?,
        })
    }

    /// Translate a Matrix identity to a remote nickname.
    ///
    /// Pure function of the identity and the compiled pattern; returns the
    /// first capture group on match, `None` otherwise.
    pub fn to_remote_nick(&self, identity: &str) -> Option<String> {
        match self.pattern.captures(identity) {
            Ok(Some(caps)) => caps.get(1).map(|m| m.as_str().to_string()),
            Ok(None) => None,
            Err(e) => {
                debug!(identity, error = %e, "Nick pattern evaluation failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ircnet_profile() -> NetworkProfile {
        NetworkProfile {
            name: "ircnet".to_string(),
            bot_user_id: "@ircnet:irc.snt.utwente.nl".to_string(),
            provisioning_url: "https://matrix-irc.snt.utwente.nl/ircnet/provision/link"
                .to_string(),
            remote_server: "irc.snt.utwente.nl".to_string(),
            nick_pattern: r"@_ircnet_(.*):irc\.snt\.utwente\.nl".to_string(),
        }
    }

    #[test]
    fn test_bridged_identity_translates() {
        let matcher = NickMatcher::for_profile(&ircnet_profile()).unwrap();
        assert_eq!(
            matcher.to_remote_nick("@_ircnet_alice:irc.snt.utwente.nl"),
            Some("alice".to_string())
        );
    }

    #[test]
    fn test_ordinary_user_is_a_miss() {
        let matcher = NickMatcher::for_profile(&ircnet_profile()).unwrap();
        assert_eq!(matcher.to_remote_nick("@bob:matrix.org"), None);
    }

    #[test]
    fn test_miss_on_wrong_server() {
        let matcher = NickMatcher::for_profile(&ircnet_profile()).unwrap();
        assert_eq!(matcher.to_remote_nick("@_ircnet_alice:matrix.org"), None);
    }
}
