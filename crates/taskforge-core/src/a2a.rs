//! Agent-to-agent messaging.
//!
//! Delivery is a direct call into the target agent's `handle_message`, not a
//! queued bus: the reply (when any) comes back synchronously. A bounded
//! history of everything sent and received is retained for inspection.

use crate::error::TaskForgeError;
use crate::now_ms;
use crate::registry::AgentRegistry;
use crate::task::TaskId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Kinds of inter-agent messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum A2aMessageType {
    Request,
    Response,
    Notification,
    Confirmation,
    StatusUpdate,
}

/// One point-to-point message between agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct A2aMessage {
    pub id: String,
    pub from: String,
    pub to: String,
    pub message_type: A2aMessageType,
    pub task_id: Option<TaskId>,
    pub payload: serde_json::Value,
    pub timestamp: i64,
    pub response_to: Option<String>,
    pub requires_response: bool,
}

impl A2aMessage {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        message_type: A2aMessageType,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: format!("msg-{}", Uuid::new_v4()),
            from: from.into(),
            to: to.into(),
            message_type,
            task_id: None,
            payload,
            timestamp: now_ms(),
            response_to: None,
            requires_response: false,
        }
    }

    pub fn with_task(mut self, task_id: impl Into<TaskId>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_requires_response(mut self, requires_response: bool) -> Self {
        self.requires_response = requires_response;
        self
    }

    /// Build a reply to this message, correlation fields filled in.
    pub fn reply(&self, from: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id: format!("msg-{}", Uuid::new_v4()),
            from: from.into(),
            to: self.from.clone(),
            message_type: A2aMessageType::Response,
            task_id: self.task_id.clone(),
            payload,
            timestamp: now_ms(),
            response_to: Some(self.id.clone()),
            requires_response: false,
        }
    }
}

/// Point-to-point message delivery between registered agents.
pub struct A2aManager {
    registry: Arc<AgentRegistry>,
    history: Mutex<VecDeque<A2aMessage>>,
    history_limit: usize,
}

impl A2aManager {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self::with_history_limit(registry, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(registry: Arc<AgentRegistry>, history_limit: usize) -> Self {
        Self {
            registry,
            history: Mutex::new(VecDeque::new()),
            history_limit,
        }
    }

    /// Deliver a message to its target agent, returning the reply when the
    /// target produced one. Fails fast when the target is not registered.
    pub async fn send_message(
        &self,
        message: A2aMessage,
    ) -> Result<Option<A2aMessage>, TaskForgeError> {
        let agent = self
            .registry
            .get(&message.to)
            .ok_or_else(|| TaskForgeError::UnknownAgent(message.to.clone()))?;

        debug!(
            message_id = %message.id,
            from = %message.from,
            to = %message.to,
            message_type = ?message.message_type,
            "delivering a2a message"
        );

        self.record(message.clone()).await;
        let reply = agent.handle_message(&message).await;
        if let Some(reply) = &reply {
            self.record(reply.clone()).await;
        }
        Ok(reply)
    }

    /// Ask the target agent to confirm; the reply's `confirmed` payload field
    /// decides, and no reply counts as a refusal.
    pub async fn request_confirmation(
        &self,
        from: &str,
        to: &str,
        prompt: &str,
        task_id: Option<TaskId>,
    ) -> Result<bool, TaskForgeError> {
        let mut message = A2aMessage::new(
            from,
            to,
            A2aMessageType::Confirmation,
            serde_json::json!({ "prompt": prompt }),
        )
        .with_requires_response(true);
        message.task_id = task_id;

        let reply = self.send_message(message).await?;
        Ok(reply
            .and_then(|r| r.payload.get("confirmed").and_then(|v| v.as_bool()))
            .unwrap_or(false))
    }

    /// Fire-and-forget notification.
    pub async fn send_notification(
        &self,
        from: &str,
        to: &str,
        notification: &str,
    ) -> Result<(), TaskForgeError> {
        let message = A2aMessage::new(
            from,
            to,
            A2aMessageType::Notification,
            serde_json::json!({ "notification": notification }),
        );
        self.send_message(message).await?;
        Ok(())
    }

    /// Fire-and-forget status update tied to a task.
    pub async fn send_status_update(
        &self,
        from: &str,
        to: &str,
        status: &str,
        task_id: Option<TaskId>,
    ) -> Result<(), TaskForgeError> {
        let mut message = A2aMessage::new(
            from,
            to,
            A2aMessageType::StatusUpdate,
            serde_json::json!({ "status": status }),
        );
        message.task_id = task_id;
        self.send_message(message).await?;
        Ok(())
    }

    /// Messages sent to or from the given agent, oldest first.
    pub async fn history_for_agent(&self, agent_id: &str) -> Vec<A2aMessage> {
        self.history
            .lock()
            .await
            .iter()
            .filter(|m| m.from == agent_id || m.to == agent_id)
            .cloned()
            .collect()
    }

    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }

    async fn record(&self, message: A2aMessage) {
        let mut history = self.history.lock().await;
        if history.len() >= self.history_limit {
            history.pop_front();
        }
        history.push_back(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, AgentRole, AgentSpec, TaskContext};
    use crate::error::TaskError;
    use crate::task::{Task, TaskType};

    struct EchoAgent {
        spec: AgentSpec,
    }

    #[async_trait::async_trait]
    impl Agent for EchoAgent {
        fn spec(&self) -> &AgentSpec {
            &self.spec
        }

        async fn execute_task(
            &self,
            _task: &Task,
            _context: &TaskContext,
        ) -> Result<serde_json::Value, TaskError> {
            Ok(serde_json::json!({}))
        }

        async fn handle_message(&self, message: &A2aMessage) -> Option<A2aMessage> {
            match message.message_type {
                A2aMessageType::Confirmation => {
                    Some(message.reply(&self.spec.id, serde_json::json!({ "confirmed": true })))
                }
                A2aMessageType::Request => {
                    Some(message.reply(&self.spec.id, serde_json::json!({ "echo": message.payload })))
                }
                _ => None,
            }
        }
    }

    fn setup() -> (Arc<AgentRegistry>, A2aManager) {
        let registry = Arc::new(AgentRegistry::new());
        registry.register(Arc::new(EchoAgent {
            spec: AgentSpec::new("echo", "Echo", AgentRole::General),
        }));
        let manager = A2aManager::new(registry.clone());
        (registry, manager)
    }

    #[tokio::test]
    async fn test_unknown_target_fails_fast() {
        let (_registry, manager) = setup();
        let message = A2aMessage::new("a", "nobody", A2aMessageType::Request, serde_json::json!({}));
        let err = manager.send_message(message).await.unwrap_err();
        assert!(matches!(err, TaskForgeError::UnknownAgent(_)));
    }

    #[tokio::test]
    async fn test_request_reply_correlation() {
        let (_registry, manager) = setup();
        let message =
            A2aMessage::new("caller", "echo", A2aMessageType::Request, serde_json::json!({"q": 1}));
        let id = message.id.clone();
        let reply = manager.send_message(message).await.unwrap().unwrap();
        assert_eq!(reply.response_to.as_deref(), Some(id.as_str()));
        assert_eq!(reply.to, "caller");
    }

    #[tokio::test]
    async fn test_confirmation_round_trip() {
        let (_registry, manager) = setup();
        let confirmed = manager
            .request_confirmation("caller", "echo", "proceed?", None)
            .await
            .unwrap();
        assert!(confirmed);
    }

    #[tokio::test]
    async fn test_notification_recorded_without_reply() {
        let (_registry, manager) = setup();
        manager.send_notification("caller", "echo", "done").await.unwrap();
        let history = manager.history_for_agent("echo").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message_type, A2aMessageType::Notification);
        assert!(!history[0].requires_response);
    }

    #[tokio::test]
    async fn test_status_update_carries_task_id() {
        let (_registry, manager) = setup();
        manager
            .send_status_update("caller", "echo", "running", Some("task-1".to_string()))
            .await
            .unwrap();
        let history = manager.history_for_agent("echo").await;
        assert_eq!(history[0].message_type, A2aMessageType::StatusUpdate);
        assert_eq!(history[0].task_id.as_deref(), Some("task-1"));
        assert_eq!(history[0].payload["status"], "running");
    }

    #[tokio::test]
    async fn test_history_bounded() {
        let registry = Arc::new(AgentRegistry::new());
        registry.register(Arc::new(EchoAgent {
            spec: AgentSpec::new("echo", "Echo", AgentRole::General),
        }));
        let manager = A2aManager::with_history_limit(registry, 3);

        for i in 0..5 {
            manager
                .send_notification("caller", "echo", &format!("n{i}"))
                .await
                .unwrap();
        }
        assert_eq!(manager.history_len().await, 3);
    }
}
