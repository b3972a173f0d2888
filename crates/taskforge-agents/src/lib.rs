//! Stub agent variants for the TaskForge engine.
//!
//! Each agent implements the core [`Agent`](taskforge_core::Agent) contract
//! for one task type (the general agent covers them all). Business logic is
//! stubbed: these exist to exercise scheduling, messaging and chains
//! end-to-end, and as templates for real integrations.

mod analysis;
mod general;
mod generation;
mod search;
mod validation;

pub use analysis::AnalysisAgent;
pub use general::GeneralAgent;
pub use generation::GenerationAgent;
pub use search::SearchAgent;
pub use validation::ValidationAgent;

use taskforge_core::{A2aMessage, A2aMessageType};

/// Shared message handling: confirmations are approved, requests are
/// acknowledged, notifications and status updates need no reply.
pub(crate) fn default_message_reply(agent_id: &str, message: &A2aMessage) -> Option<A2aMessage> {
    match message.message_type {
        A2aMessageType::Confirmation => {
            Some(message.reply(agent_id, serde_json::json!({ "confirmed": true })))
        }
        A2aMessageType::Request => Some(message.reply(
            agent_id,
            serde_json::json!({ "acknowledged": true }),
        )),
        A2aMessageType::Notification | A2aMessageType::StatusUpdate => {
            tracing::debug!(agent_id = %agent_id, message_type = ?message.message_type, "message received");
            None
        }
        A2aMessageType::Response => None,
    }
}
