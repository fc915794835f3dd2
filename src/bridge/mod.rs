//! Bridge provisioning: the plumb and privilege-command workflows.

pub mod orchestrator;
pub mod provision;
pub mod translate;

pub use orchestrator::{BridgeOrchestrator, PlumbOutcome, PrivilegeReport};
pub use provision::ProvisioningClient;
pub use translate::NickMatcher;
