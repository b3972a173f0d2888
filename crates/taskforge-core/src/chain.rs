//! Declarative task chains: sequential, conditional and loop workflows
//! executed by repeated orchestrator submissions.

use crate::error::TaskForgeError;
use crate::execution::{ExecutionStatus, TaskExecution};
use crate::now_ms;
use crate::orchestrator::AgentOrchestrator;
use crate::task::Task;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Guard against cycles in malformed chain definitions; chains are not
/// statically verified beyond this cap.
const MAX_VISITED_NODES: usize = 100;

/// Comparator applied by condition nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOp {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    Exists,
}

/// A field comparison over the previous task node's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainCondition {
    pub op: ConditionOp,
    /// Dotted path into the result value, e.g. `result.count`
    pub field: String,
    pub value: serde_json::Value,
}

/// One node in a chain definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChainNode {
    Task {
        id: String,
        task: Task,
        next: Option<String>,
    },
    Condition {
        id: String,
        condition: ChainCondition,
        true_branch: Option<String>,
        false_branch: Option<String>,
    },
    Loop {
        id: String,
        task: Task,
        iterations: u32,
        next: Option<String>,
    },
}

impl ChainNode {
    pub fn id(&self) -> &str {
        match self {
            ChainNode::Task { id, .. } => id,
            ChainNode::Condition { id, .. } => id,
            ChainNode::Loop { id, .. } => id,
        }
    }
}

/// A named, static graph of chain nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskChain {
    pub id: String,
    pub name: String,
    pub description: String,
    pub start_node: String,
    pub nodes: HashMap<String, ChainNode>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TaskChain {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = now_ms();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            start_node: String::new(),
            nodes: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_node(mut self, node: ChainNode) -> Self {
        self.nodes.insert(node.id().to_string(), node);
        self
    }

    pub fn with_start(mut self, node_id: impl Into<String>) -> Self {
        self.start_node = node_id.into();
        self
    }
}

/// Outcome of one chain execution: the path taken and a record per visited
/// task node (loop iterations keyed `{node_id}-loop-{i}`).
#[derive(Debug, Clone, Serialize)]
pub struct ChainExecutionResult {
    pub chain_id: String,
    pub execution_id: String,
    pub status: ExecutionStatus,
    pub node_results: HashMap<String, TaskExecution>,
    pub execution_path: Vec<String>,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub error: Option<String>,
}

/// Registers chain definitions and executes them against the orchestrator.
pub struct ChainRunner {
    orchestrator: Arc<AgentOrchestrator>,
    chains: DashMap<String, TaskChain>,
}

impl ChainRunner {
    pub fn new(orchestrator: Arc<AgentOrchestrator>) -> Self {
        Self {
            orchestrator,
            chains: DashMap::new(),
        }
    }

    pub fn register_chain(&self, chain: TaskChain) {
        info!(chain_id = %chain.id, chain_name = %chain.name, "chain registered");
        self.chains.insert(chain.id.clone(), chain);
    }

    pub fn chain(&self, chain_id: &str) -> Option<TaskChain> {
        self.chains.get(chain_id).map(|entry| entry.value().clone())
    }

    pub fn all_chains(&self) -> Vec<TaskChain> {
        self.chains.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Walk the chain from its start node. A failed task execution halts the
    /// chain as Failed; an unknown chain id is the only submission-time
    /// error.
    pub async fn execute_chain(
        &self,
        chain_id: &str,
    ) -> Result<ChainExecutionResult, TaskForgeError> {
        let chain = self
            .chain(chain_id)
            .ok_or_else(|| TaskForgeError::Chain(format!("chain '{chain_id}' not found")))?;

        let execution_id = format!("chain-exec-{}", Uuid::new_v4());
        let started_at = now_ms();
        let mut node_results: HashMap<String, TaskExecution> = HashMap::new();
        let mut execution_path: Vec<String> = Vec::new();
        let mut last_result: Option<serde_json::Value> = None;

        let fail = |node_results: HashMap<String, TaskExecution>,
                    execution_path: Vec<String>,
                    error: String| {
            warn!(chain_id = %chain_id, %error, "chain execution failed");
            ChainExecutionResult {
                chain_id: chain_id.to_string(),
                execution_id: execution_id.clone(),
                status: ExecutionStatus::Failed,
                node_results,
                execution_path,
                started_at,
                completed_at: Some(now_ms()),
                error: Some(error),
            }
        };

        let mut current = Some(chain.start_node.clone());
        let mut visited = 0usize;

        while let Some(node_id) = current {
            visited += 1;
            if visited > MAX_VISITED_NODES {
                return Ok(fail(
                    node_results,
                    execution_path,
                    format!("chain exceeded {MAX_VISITED_NODES} visited nodes (possible cycle)"),
                ));
            }

            let Some(node) = chain.nodes.get(&node_id) else {
                return Ok(fail(
                    node_results,
                    execution_path,
                    format!("node '{node_id}' not found in chain"),
                ));
            };
            execution_path.push(node_id.clone());

            match node {
                ChainNode::Task { task, next, .. } => {
                    let execution = match self.orchestrator.execute_task(task.clone()).await {
                        Ok(execution) => execution,
                        Err(error) => {
                            return Ok(fail(node_results, execution_path, error.to_string()));
                        }
                    };
                    let failed = execution.status == ExecutionStatus::Failed;
                    let error = execution.error.clone();
                    last_result = execution.result.clone();
                    node_results.insert(node_id.clone(), execution);

                    if failed {
                        return Ok(fail(
                            node_results,
                            execution_path,
                            format!(
                                "task node '{node_id}' failed: {}",
                                error.unwrap_or_else(|| "unknown error".to_string())
                            ),
                        ));
                    }
                    current = next.clone();
                }
                ChainNode::Condition {
                    condition,
                    true_branch,
                    false_branch,
                    ..
                } => {
                    let outcome = evaluate_condition(condition, last_result.as_ref());
                    current = if outcome {
                        true_branch.clone()
                    } else {
                        false_branch.clone()
                    };
                }
                ChainNode::Loop {
                    task,
                    iterations,
                    next,
                    ..
                } => {
                    for i in 0..*iterations {
                        let execution = match self.orchestrator.execute_task(task.clone()).await {
                            Ok(execution) => execution,
                            Err(error) => {
                                return Ok(fail(node_results, execution_path, error.to_string()));
                            }
                        };
                        let failed = execution.status == ExecutionStatus::Failed;
                        let error = execution.error.clone();
                        last_result = execution.result.clone();
                        node_results.insert(format!("{node_id}-loop-{i}"), execution);

                        if failed {
                            return Ok(fail(
                                node_results,
                                execution_path,
                                format!(
                                    "loop iteration {i} of node '{node_id}' failed: {}",
                                    error.unwrap_or_else(|| "unknown error".to_string())
                                ),
                            ));
                        }
                    }
                    current = next.clone();
                }
            }
        }

        info!(chain_id = %chain_id, visited, "chain completed");
        Ok(ChainExecutionResult {
            chain_id: chain_id.to_string(),
            execution_id,
            status: ExecutionStatus::Completed,
            node_results,
            execution_path,
            started_at,
            completed_at: Some(now_ms()),
            error: None,
        })
    }
}

/// Resolve the condition's dotted field path into the previous task result
/// and apply the comparator. A missing path resolves to false.
fn evaluate_condition(condition: &ChainCondition, result: Option<&serde_json::Value>) -> bool {
    let Some(mut value) = result else {
        return false;
    };

    for part in condition.field.split('.') {
        match value.get(part) {
            Some(next) => value = next,
            None => return false,
        }
    }

    match condition.op {
        ConditionOp::Equals => value == &condition.value,
        ConditionOp::NotEquals => value != &condition.value,
        ConditionOp::GreaterThan => match (value.as_f64(), condition.value.as_f64()) {
            (Some(lhs), Some(rhs)) => lhs > rhs,
            _ => false,
        },
        ConditionOp::LessThan => match (value.as_f64(), condition.value.as_f64()) {
            (Some(lhs), Some(rhs)) => lhs < rhs,
            _ => false,
        },
        ConditionOp::Contains => match (value.as_str(), condition.value.as_str()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
        ConditionOp::Exists => !value.is_null(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskType;
    use serde_json::json;

    fn condition(op: ConditionOp, field: &str, value: serde_json::Value) -> ChainCondition {
        ChainCondition {
            op,
            field: field.to_string(),
            value,
        }
    }

    #[test]
    fn test_equals_and_not_equals() {
        let result = json!({"status": "ok", "count": 3});
        assert!(evaluate_condition(
            &condition(ConditionOp::Equals, "status", json!("ok")),
            Some(&result)
        ));
        assert!(evaluate_condition(
            &condition(ConditionOp::NotEquals, "status", json!("error")),
            Some(&result)
        ));
    }

    #[test]
    fn test_numeric_comparisons() {
        let result = json!({"stats": {"count": 10}});
        assert!(evaluate_condition(
            &condition(ConditionOp::GreaterThan, "stats.count", json!(5)),
            Some(&result)
        ));
        assert!(!evaluate_condition(
            &condition(ConditionOp::LessThan, "stats.count", json!(5)),
            Some(&result)
        ));
    }

    #[test]
    fn test_contains_and_exists() {
        let result = json!({"message": "all systems nominal", "detail": null});
        assert!(evaluate_condition(
            &condition(ConditionOp::Contains, "message", json!("nominal")),
            Some(&result)
        ));
        assert!(!evaluate_condition(
            &condition(ConditionOp::Exists, "detail", json!(null)),
            Some(&result)
        ));
        assert!(evaluate_condition(
            &condition(ConditionOp::Exists, "message", json!(null)),
            Some(&result)
        ));
    }

    #[test]
    fn test_missing_path_is_false() {
        let result = json!({"a": 1});
        assert!(!evaluate_condition(
            &condition(ConditionOp::Equals, "b.c", json!(1)),
            Some(&result)
        ));
        assert!(!evaluate_condition(
            &condition(ConditionOp::Exists, "a", json!(null)),
            None
        ));
    }

    #[test]
    fn test_node_serde_tagging() {
        let node = ChainNode::Condition {
            id: "c1".to_string(),
            condition: condition(ConditionOp::Exists, "result", json!(null)),
            true_branch: Some("t".to_string()),
            false_branch: None,
        };
        let encoded = serde_json::to_value(&node).unwrap();
        assert_eq!(encoded["type"], "condition");

        let decoded: ChainNode = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.id(), "c1");
    }

    #[test]
    fn test_chain_builder() {
        let task = Task::new("t1", "t", TaskType::Search);
        let chain = TaskChain::new("chain-1", "demo")
            .with_node(ChainNode::Task {
                id: "n1".to_string(),
                task,
                next: None,
            })
            .with_start("n1");
        assert_eq!(chain.start_node, "n1");
        assert!(chain.nodes.contains_key("n1"));
    }
}
