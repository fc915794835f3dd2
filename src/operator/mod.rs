//! Operator prompting collaborator.
//!
//! The workflows never read the console themselves; every human-in-the-loop
//! gate goes through this trait, with the prompt values passed explicitly
//! per invocation. That keeps the state machines drivable from any front
//! end, scripted tests included.

pub mod console;

use async_trait::async_trait;

use crate::common::error::PromptError;
use crate::common::types::{PlumbRequest, RoomId, RoomSnapshot, UserId};

pub use console::ConsoleOperator;

/// Login credentials gathered interactively when no session is cached.
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub homeserver: String,
    pub user: String,
    pub password: String,
}

/// Top-level menu choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolChoice {
    Plumb { network: String },
    GrantOps { network: String },
    RevokeOps { network: String },
    LeaveRooms,
    Quit,
}

/// Source of operator decisions. `None` returns mean the operator aborted
/// the current workflow; they are never an error.
#[async_trait]
pub trait Operator: Send {
    /// Pick what to do next from the main menu.
    async fn choose_tool(&mut self, networks: &[String]) -> Result<ToolChoice, PromptError>;

    /// Gather credentials for an interactive login.
    async fn collect_login(&mut self, default_user: &str) -> Result<LoginInput, PromptError>;

    /// Gather room, remote channel and remote op nick for a plumb attempt.
    async fn collect_plumb_input(
        &mut self,
        rooms: &[RoomSnapshot],
    ) -> Result<Option<PlumbRequest>, PromptError>;

    /// Pick one room.
    async fn select_room(
        &mut self,
        prompt: &str,
        rooms: &[RoomSnapshot],
    ) -> Result<Option<RoomId>, PromptError>;

    /// Pick any number of rooms.
    async fn select_rooms(
        &mut self,
        prompt: &str,
        rooms: &[RoomSnapshot],
    ) -> Result<Vec<RoomId>, PromptError>;

    /// Ask for a remote channel name.
    async fn collect_channel_name(&mut self) -> Result<Option<String>, PromptError>;

    /// Pick any number of room members.
    async fn select_members(&mut self, members: &[UserId]) -> Result<Vec<UserId>, PromptError>;

    /// Explicit confirmation gate; `false` aborts the surrounding workflow.
    async fn confirm(&mut self, message: &str) -> Result<bool, PromptError>;

    /// Surface a message to the operator.
    fn report(&mut self, message: &str);
}
