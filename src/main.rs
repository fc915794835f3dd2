//! mxplumb - Matrix-IRC bridge plumbing tool
//!
//! An operator console that invites a network's bridge agent into a room,
//! waits for it to accept, asks the provisioning service to link the room
//! to a remote channel, and later dispatches channel-operator commands
//! through the agent.

mod bridge;
mod common;
mod config;
mod matrix;
mod operator;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use bridge::BridgeOrchestrator;
use common::types::PrivilegeAction;
use config::{env::get_config_path, load_and_validate, Config};
use matrix::client::Session;
use matrix::session::SettingsStore;
use matrix::{HttpMatrixClient, MatrixApi, RoomStateView};
use operator::{ConsoleOperator, Operator, ToolChoice};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("mxplumb v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Homeserver: {}", config.matrix.homeserver);
    info!("  User: {}", config.matrix.user);
    for net in &config.networks {
        info!("  Network: {} (agent {})", net.name, net.bot_user_id);
    }

    let mut operator = ConsoleOperator::new();
    let mut store = SettingsStore::load(config.session_file())?;

    let session = resolve_session(&config, &mut store, &mut operator).await?;
    let user_id = session.user_id.clone();
    let api: Arc<dyn MatrixApi> = Arc::new(HttpMatrixClient::new(session));

    operator.report(&format!("\nWelcome, {}\n", user_id));

    let networks: Vec<String> = config.networks.iter().map(|n| n.name.clone()).collect();
    let poll_interval = Duration::from_millis(config.poll_interval_ms());

    // One workflow instance at a time, a fresh orchestrator per attempt.
    loop {
        let choice = operator.choose_tool(&networks).await?;
        let result = match &choice {
            ToolChoice::Quit => break,
            ToolChoice::Plumb { network } => {
                let mut orch =
                    make_orchestrator(&config, network, &api, &user_id, poll_interval)?;
                orch.run_plumb(&mut operator).await.map(|outcome| {
                    info!(?outcome, "Plumb workflow finished");
                })
            }
            ToolChoice::GrantOps { network } => {
                let mut orch =
                    make_orchestrator(&config, network, &api, &user_id, poll_interval)?;
                let result = orch
                    .run_privilege(&mut operator, PrivilegeAction::Grant)
                    .await;
                result.map(|report| report_privilege(&mut operator, report))
            }
            ToolChoice::RevokeOps { network } => {
                let mut orch =
                    make_orchestrator(&config, network, &api, &user_id, poll_interval)?;
                let result = orch
                    .run_privilege(&mut operator, PrivilegeAction::Revoke)
                    .await;
                result.map(|report| report_privilege(&mut operator, report))
            }
            ToolChoice::LeaveRooms => {
                // Any profile works: leaving rooms does not touch the agent.
                let network = networks[0].clone();
                let mut orch =
                    make_orchestrator(&config, &network, &api, &user_id, poll_interval)?;
                orch.run_leave(&mut operator).await
            }
        };

        // Workflow failures end the attempt, never the tool.
        if let Err(e) = result {
            warn!(error = %e, "Workflow failed");
            operator.report(&format!("Workflow failed: {}", e));
        }
    }

    info!("Exiting...");
    Ok(())
}

/// Restore a cached session or log in interactively, caching the token.
async fn resolve_session(
    config: &Config,
    store: &mut SettingsStore,
    operator: &mut dyn Operator,
) -> Result<Session> {
    if let Some(token) = &config.matrix.access_token {
        info!("Using access token from configuration");
        return Ok(Session {
            homeserver: config.matrix.homeserver.clone(),
            user_id: config.matrix.user.clone(),
            access_token: token.clone(),
        });
    }

    if let Some(session) = store.session() {
        info!(user_id = %session.user_id, "Restored cached session");
        return Ok(session);
    }

    // Non-interactive login when a password is supplied via the
    // environment; falls back to the prompt if the server refuses it.
    if let Some(password) = &config.matrix.password {
        info!("Logging in with password from environment");
        match HttpMatrixClient::login(&config.matrix.homeserver, &config.matrix.user, password)
            .await
        {
            Ok(session) => {
                if let Err(e) = store.remember_session(&session) {
                    warn!(error = %e, "Could not persist session");
                }
                return Ok(session);
            }
            Err(e) => {
                warn!(error = %e, "Environment password login failed");
                operator.report(&format!("Login failed: {}", e));
            }
        }
    }

    loop {
        let input = operator.collect_login(&config.matrix.user).await?;
        let homeserver = if input.homeserver.is_empty() {
            config.matrix.homeserver.clone()
        } else {
            input.homeserver
        };

        match HttpMatrixClient::login(&homeserver, &input.user, &input.password).await {
            Ok(session) => {
                if let Err(e) = store.remember_session(&session) {
                    warn!(error = %e, "Could not persist session");
                }
                return Ok(session);
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                operator.report(&format!("Login failed: {}", e));
            }
        }
    }
}

fn make_orchestrator(
    config: &Config,
    network: &str,
    api: &Arc<dyn MatrixApi>,
    user_id: &str,
    poll_interval: Duration,
) -> Result<BridgeOrchestrator> {
    let profile = config
        .network(network)
        .ok_or_else(|| anyhow::anyhow!("unknown network '{}'", network))?
        .clone();
    Ok(BridgeOrchestrator::new(
        RoomStateView::new(Arc::clone(api)),
        profile,
        user_id.to_string(),
        poll_interval,
    )?)
}

/// Summarize a privilege batch for the operator.
fn report_privilege(operator: &mut dyn Operator, report: Option<bridge::PrivilegeReport>) {
    let Some(report) = report else {
        operator.report("Aborted");
        return;
    };
    operator.report(&format!(
        "Dispatched {} command(s), {} translation miss(es), {} send failure(s)",
        report.dispatched.len(),
        report.misses.len(),
        report.send_failures.len()
    ));
}
