//! Agent registry.

use crate::agent::{Agent, AgentRole};
use crate::task::TaskType;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

/// Holds the set of registered agents, indexed by id and queryable by role
/// and capability.
#[derive(Default)]
pub struct AgentRegistry {
    agents: DashMap<String, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            agents: DashMap::new(),
        }
    }

    /// Register an agent, replacing any previous registration for the id.
    pub fn register(&self, agent: Arc<dyn Agent>) {
        let spec = agent.spec();
        info!(agent_id = %spec.id, agent_name = %spec.name, role = %spec.role.as_str(), "agent registered");
        self.agents.insert(spec.id.clone(), agent);
    }

    pub fn unregister(&self, agent_id: &str) -> Option<Arc<dyn Agent>> {
        let removed = self.agents.remove(agent_id).map(|(_, agent)| agent);
        if removed.is_some() {
            info!(agent_id = %agent_id, "agent unregistered");
        }
        removed
    }

    pub fn get(&self, agent_id: &str) -> Option<Arc<dyn Agent>> {
        self.agents.get(agent_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.agents.contains_key(agent_id)
    }

    pub fn all(&self) -> Vec<Arc<dyn Agent>> {
        self.agents.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn agent_ids(&self) -> Vec<String> {
        self.agents.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn agents_with_role(&self, role: AgentRole) -> Vec<Arc<dyn Agent>> {
        self.agents
            .iter()
            .filter(|entry| entry.value().spec().role == role)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn agents_with_capability(&self, task_type: TaskType) -> Vec<Arc<dyn Agent>> {
        self.agents
            .iter()
            .filter(|entry| entry.value().spec().capabilities.contains(&task_type))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
