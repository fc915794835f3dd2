//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors from the Matrix client-server round-trips.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// The round-trip itself failed (DNS, TLS, connection, body decode).
    #[error("Network round-trip failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Login failed ({status}): {body}")]
    LoginFailed { status: u16, body: String },

    /// The homeserver rejected an invite. Non-fatal: the workflow surfaces
    /// a warning and lets the operator decide whether to proceed.
    #[error("Invite rejected by server ({status}): {body}")]
    InviteRejected { status: u16, body: String },

    #[error("Send rejected by server ({status}): {body}")]
    SendRejected { status: u16, body: String },

    #[error("Unexpected server response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },
}

/// Errors from the membership wait primitive.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("Timed out after {timeout_ms}ms waiting for {user_id} to join {room_id}")]
    Timeout {
        room_id: String,
        user_id: String,
        timeout_ms: u64,
    },

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Errors from the provisioning client.
///
/// A non-200 provisioning response is not an error; it is reported as
/// `ProvisionOutcome::Failed` so the raw body reaches the operator.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Provisioning round-trip failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Errors from the operator prompting collaborator.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Operator input stream closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Workflow-level failures surfaced to the operator.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No direct chat with {agent} found - open a direct conversation with the bridge agent first")]
    AgentChatNotFound { agent: String },

    #[error("Room {room} is not bridged: {agent} is not a member")]
    NotABridgedRoom { room: String, agent: String },

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error(transparent)]
    Wait(#[from] WaitError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Result type alias for Matrix operations.
pub type MatrixResult<T> = std::result::Result<T, MatrixError>;

/// Result type alias for workflow operations.
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;
