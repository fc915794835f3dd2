//! Shared types used across the application.

/// Matrix room identifier, e.g. `!abc123:example.org`.
pub type RoomId = String;

/// Matrix user identifier, e.g. `@alice:example.org`.
pub type UserId = String;

/// Point-in-time view of one joined room.
///
/// Snapshots are derived entirely from the last sync round-trip and are
/// replaced wholesale on every refresh; nothing merges into an old snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub display_name: String,
    pub members: Vec<UserId>,
}

impl RoomSnapshot {
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

/// Operator-supplied input for one plumb attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlumbRequest {
    /// Room to bridge.
    pub room_id: RoomId,
    /// Remote channel name, e.g. `#chan`.
    pub channel: String,
    /// Nick of an operator on the remote channel.
    pub op_nick: String,
}

/// Result of one provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The service answered HTTP 200.
    Linked,
    /// Any other status; `body` is the raw response for operator display.
    Failed { body: String },
}

impl ProvisionOutcome {
    pub fn is_linked(&self) -> bool {
        matches!(self, ProvisionOutcome::Linked)
    }
}

/// Direction of a channel-operator privilege change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeAction {
    Grant,
    Revoke,
}

impl PrivilegeAction {
    /// IRC mode flag for this action.
    pub fn mode_flag(&self) -> &'static str {
        match self {
            PrivilegeAction::Grant => "+o",
            PrivilegeAction::Revoke => "-o",
        }
    }
}

/// One privilege change addressed to the bridge agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeCommand {
    /// Direct-chat room with the bridge agent.
    pub room_id: RoomId,
    /// Remote nickname the change applies to.
    pub nick: String,
    pub action: PrivilegeAction,
}

impl PrivilegeCommand {
    /// Message body understood by the bridge agent.
    pub fn command_body(&self, channel: &str) -> String {
        format!(
            "!cmd MODE {} {} {}",
            channel,
            self.action.mode_flag(),
            self.nick
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_member() {
        let room = RoomSnapshot {
            room_id: "!r:x".to_string(),
            display_name: "Room".to_string(),
            members: vec!["@a:x".to_string(), "@b:x".to_string()],
        };
        assert!(room.has_member("@a:x"));
        assert!(!room.has_member("@c:x"));
    }

    #[test]
    fn test_command_body() {
        let grant = PrivilegeCommand {
            room_id: "!d:x".to_string(),
            nick: "alice".to_string(),
            action: PrivilegeAction::Grant,
        };
        assert_eq!(grant.command_body("#chan"), "!cmd MODE #chan +o alice");

        let revoke = PrivilegeCommand {
            action: PrivilegeAction::Revoke,
            ..grant
        };
        assert_eq!(revoke.command_body("#chan"), "!cmd MODE #chan -o alice");
    }
}
