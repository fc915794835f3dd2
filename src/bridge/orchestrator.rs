//! Bridge orchestrator.
//!
//! Composes the room state view, membership wait primitive, provisioning
//! client and identity translator into the two operator workflows: plumbing
//! a room to a remote channel, and issuing privilege commands against a
//! bridged channel. One workflow instance runs at a time; every mutating
//! call (invite, provision, send) is fire-and-forget against an external
//! system, so an abort at any gate leaves nothing to roll back.

use std::time::Duration;

use tracing::{info, warn};

use crate::common::error::{MatrixError, WorkflowError, WorkflowResult};
use crate::common::types::{
    PrivilegeAction, PrivilegeCommand, ProvisionOutcome, RoomId, UserId,
};
use crate::config::types::NetworkProfile;
use crate::matrix::view::RoomStateView;
use crate::matrix::wait::wait_for_member;
use crate::operator::Operator;

use super::provision::ProvisioningClient;
use super::translate::NickMatcher;

/// States of the plumb workflow, logged as the machine advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlumbState {
    CollectInput,
    InviteAgent,
    AwaitAgentJoin,
    AwaitOperatorAck,
    CallProvisioning,
}

/// Terminal result of one plumb attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlumbOutcome {
    Provisioned,
    ProvisioningFailed { body: String },
    /// The operator declined at a confirmation gate.
    Aborted,
}

/// What a privilege-command batch did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrivilegeReport {
    /// Nicks a command was dispatched for, in selection order.
    pub dispatched: Vec<String>,
    /// Selected members with no remote nickname.
    pub misses: Vec<UserId>,
    /// Nicks whose command send was rejected, with the server's answer.
    pub send_failures: Vec<(String, String)>,
}

/// Drives the plumb and privilege workflows for one network profile.
pub struct BridgeOrchestrator {
    view: RoomStateView,
    provisioner: ProvisioningClient,
    profile: NetworkProfile,
    matcher: NickMatcher,
    /// Identity making the provisioning request.
    user_id: UserId,
    poll_interval: Duration,
}

impl BridgeOrchestrator {
    pub fn new(
        view: RoomStateView,
        profile: NetworkProfile,
        user_id: UserId,
        poll_interval: Duration,
    ) -> Result<Self, fancy_regex::Error> {
        let matcher = NickMatcher::for_profile(&profile)?;
        Ok(Self {
            view,
            provisioner: ProvisioningClient::new(),
            profile,
            matcher,
            user_id,
            poll_interval,
        })
    }

    /// Plumb workflow:
    /// CollectInput -> InviteAgent -> AwaitAgentJoin -> AwaitOperatorAck ->
    /// CallProvisioning -> (Provisioned | ProvisioningFailed).
    pub async fn run_plumb(
        &mut self,
        operator: &mut dyn Operator,
    ) -> WorkflowResult<PlumbOutcome> {
        let agent = self.profile.bot_user_id.clone();

        info!(state = ?PlumbState::CollectInput, network = %self.profile.name, "Plumb workflow started");
        self.view.refresh().await?;
        let Some(request) = operator.collect_plumb_input(self.view.rooms()).await? else {
            return Ok(PlumbOutcome::Aborted);
        };

        info!(state = ?PlumbState::InviteAgent, %agent, room_id = %request.room_id, "Inviting bridge agent");
        match self.view.invite(&request.room_id, &agent).await {
            Ok(()) => {}
            Err(MatrixError::InviteRejected { status, body }) => {
                // Non-fatal: the agent may already be invited or joined.
                warn!(status, %body, "Invite rejected");
                operator.report(&format!(
                    "Room invite seemed to fail ({}): {}",
                    status, body
                ));
                if !operator.confirm("Continue anyway?").await? {
                    return Ok(PlumbOutcome::Aborted);
                }
            }
            Err(e) => return Err(e.into()),
        }

        info!(state = ?PlumbState::AwaitAgentJoin, %agent, "Waiting for agent to accept");
        operator.report(&format!(
            "Waiting for {} to join {} - acceptance is out-of-band and may take a while",
            agent, request.room_id
        ));
        // No timeout: a human or bot accepts the invite on its own schedule.
        wait_for_member(
            &mut self.view,
            &request.room_id,
            &agent,
            self.poll_interval,
            None,
        )
        .await?;

        // The tool has no way to set the agent's power level itself; that
        // stays a manual out-of-band step behind an explicit confirmation.
        info!(state = ?PlumbState::AwaitOperatorAck, "Awaiting operator acknowledgement");
        operator.report(&format!(
            "Agent joined - now give {} power level 100 in the room",
            agent
        ));
        if !operator.confirm("Done? Provisioning fires exactly once").await? {
            return Ok(PlumbOutcome::Aborted);
        }

        info!(state = ?PlumbState::CallProvisioning, channel = %request.channel, "Calling provisioning service");
        match self
            .provisioner
            .provision_link(&self.profile, &request, &self.user_id)
            .await?
        {
            ProvisionOutcome::Linked => {
                operator.report(&format!(
                    "Plumbing succeeded - IRC user {} must now reply to the bot",
                    request.op_nick
                ));
                Ok(PlumbOutcome::Provisioned)
            }
            ProvisionOutcome::Failed { body } => {
                operator.report(&format!("Plumbing failed: {}", body));
                Ok(PlumbOutcome::ProvisioningFailed { body })
            }
        }
    }

    /// Privilege workflow:
    /// FindAgentDirectChat -> SelectRoom -> ValidateAgentPresence ->
    /// CollectChannelName -> SelectUsers -> TranslateEach ->
    /// DispatchCommands -> Done.
    ///
    /// Returns `None` when the operator aborts at a prompt.
    pub async fn run_privilege(
        &mut self,
        operator: &mut dyn Operator,
        action: PrivilegeAction,
    ) -> WorkflowResult<Option<PrivilegeReport>> {
        let agent = self.profile.bot_user_id.clone();

        self.view.refresh().await?;

        // FindAgentDirectChat: exactly two members, one of them the agent.
        let direct_chat: RoomId = self
            .view
            .rooms()
            .iter()
            .find(|r| r.members.len() == 2 && r.has_member(&agent))
            .map(|r| r.room_id.clone())
            .ok_or_else(|| WorkflowError::AgentChatNotFound {
                agent: agent.clone(),
            })?;
        info!(room_id = %direct_chat, %agent, "Found agent direct chat");

        let Some(room_id) = operator
            .select_room("Choose the bridged room:", self.view.rooms())
            .await?
        else {
            return Ok(None);
        };

        // ValidateAgentPresence
        let room = self
            .view
            .find(&room_id)
            .filter(|r| r.has_member(&agent))
            .ok_or_else(|| WorkflowError::NotABridgedRoom {
                room: room_id.clone(),
                agent: agent.clone(),
            })?;
        let members = room.members.clone();

        let Some(channel) = operator.collect_channel_name().await? else {
            return Ok(None);
        };

        let selected = operator.select_members(&members).await?;

        // TranslateEach: misses are reported and skipped, never fatal.
        let mut report = PrivilegeReport::default();
        let mut commands: Vec<PrivilegeCommand> = Vec::new();
        for user in selected {
            match self.matcher.to_remote_nick(&user) {
                Some(nick) => commands.push(PrivilegeCommand {
                    room_id: direct_chat.clone(),
                    nick,
                    action,
                }),
                None => {
                    warn!(%user, "No remote nickname - skipping");
                    operator.report(&format!("{}: no remote nickname, skipped", user));
                    report.misses.push(user);
                }
            }
        }

        // DispatchCommands: selection order, each send independent.
        for command in &commands {
            let body = command.command_body(&channel);
            match self.view.send_text(&command.room_id, &body).await {
                Ok(()) => {
                    info!(nick = %command.nick, %body, "Command dispatched");
                    report.dispatched.push(command.nick.clone());
                }
                Err(e) => {
                    warn!(nick = %command.nick, error = %e, "Command send failed");
                    operator.report(&format!("Send failed for {}: {}", command.nick, e));
                    report.send_failures.push((command.nick.clone(), e.to_string()));
                }
            }
        }

        Ok(Some(report))
    }

    /// Leave each selected room; failures are reported, not retried.
    pub async fn run_leave(&mut self, operator: &mut dyn Operator) -> WorkflowResult<()> {
        self.view.refresh().await?;
        let rooms = operator
            .select_rooms("Select rooms to leave:", self.view.rooms())
            .await?;

        for room_id in rooms {
            let name = self
                .view
                .find(&room_id)
                .map(|r| r.display_name.clone())
                .unwrap_or_else(|| room_id.clone());
            info!(%room_id, "Leaving room");
            operator.report(&format!("Leaving room {} ...", name));
            if let Err(e) = self.view.leave(&room_id).await {
                warn!(%room_id, error = %e, "Leave failed");
                operator.report(&format!("Leave failed for {}: {}", name, e));
            }
        }
        Ok(())
    }
}
