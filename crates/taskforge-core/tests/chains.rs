//! Chain execution tests: sequential walks, condition branching, loops,
//! failure halts and the malformed-chain guard.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use taskforge_core::{
    A2aMessage, Agent, AgentRole, AgentSpec, ChainCondition, ChainNode, ConditionOp,
    ExecutionStatus, OrchestratorContext, Task, TaskChain, TaskContext, TaskError, TaskType,
    search_analysis_chain,
};

/// Agent returning a scripted result; fails when the task carries a
/// `fail` parameter.
struct ScriptedAgent {
    spec: AgentSpec,
    result: serde_json::Value,
    calls: AtomicU32,
}

impl ScriptedAgent {
    fn new(result: serde_json::Value) -> Self {
        Self {
            spec: AgentSpec::new("scripted", "scripted", AgentRole::General)
                .with_capabilities(TaskType::all()),
            result,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait::async_trait]
impl Agent for ScriptedAgent {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn execute_task(
        &self,
        task: &Task,
        _context: &TaskContext,
    ) -> Result<serde_json::Value, TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if task.param("fail").is_some() {
            return Err(TaskError::from_message("invalid input for chain node"));
        }
        Ok(self.result.clone())
    }

    async fn handle_message(&self, _message: &A2aMessage) -> Option<A2aMessage> {
        None
    }
}

fn context_with(result: serde_json::Value) -> OrchestratorContext {
    let context = OrchestratorContext::builder().build();
    context.registry().register(Arc::new(ScriptedAgent::new(result)));
    context
}

fn task_node(id: &str, next: Option<&str>) -> ChainNode {
    ChainNode::Task {
        id: id.to_string(),
        task: Task::new(format!("task-{id}"), id, TaskType::Search),
        next: next.map(String::from),
    }
}

#[tokio::test]
async fn test_sequential_chain_records_path() {
    let context = context_with(serde_json::json!({"ok": true}));
    let chain = TaskChain::new("c1", "sequential")
        .with_node(task_node("first", Some("second")))
        .with_node(task_node("second", None))
        .with_start("first");
    context.chains().register_chain(chain);

    let result = context.chains().execute_chain("c1").await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.execution_path, vec!["first", "second"]);
    assert_eq!(result.node_results.len(), 2);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_condition_takes_true_branch() {
    let context = context_with(serde_json::json!({"count": 5}));
    let chain = TaskChain::new("c1", "branching")
        .with_node(task_node("probe", Some("check")))
        .with_node(ChainNode::Condition {
            id: "check".to_string(),
            condition: ChainCondition {
                op: ConditionOp::GreaterThan,
                field: "count".to_string(),
                value: serde_json::json!(3),
            },
            true_branch: Some("on-true".to_string()),
            false_branch: Some("on-false".to_string()),
        })
        .with_node(task_node("on-true", None))
        .with_node(task_node("on-false", None))
        .with_start("probe");
    context.chains().register_chain(chain);

    let result = context.chains().execute_chain("c1").await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(result.execution_path, vec!["probe", "check", "on-true"]);
    assert!(result.node_results.contains_key("on-true"));
    assert!(!result.node_results.contains_key("on-false"));
}

#[tokio::test]
async fn test_condition_takes_false_branch() {
    let context = context_with(serde_json::json!({"count": 1}));
    let chain = TaskChain::new("c1", "branching")
        .with_node(task_node("probe", Some("check")))
        .with_node(ChainNode::Condition {
            id: "check".to_string(),
            condition: ChainCondition {
                op: ConditionOp::GreaterThan,
                field: "count".to_string(),
                value: serde_json::json!(3),
            },
            true_branch: Some("on-true".to_string()),
            false_branch: None,
        })
        .with_node(task_node("on-true", None))
        .with_start("probe");
    context.chains().register_chain(chain);

    let result = context.chains().execute_chain("c1").await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Completed);
    // Chain ends at the condition: no false branch configured
    assert_eq!(result.execution_path, vec!["probe", "check"]);
}

#[tokio::test]
async fn test_loop_node_runs_fixed_iterations() {
    let context = context_with(serde_json::json!({"ok": true}));
    let chain = TaskChain::new("c1", "looping")
        .with_node(ChainNode::Loop {
            id: "repeat".to_string(),
            task: Task::new("task-repeat", "repeat", TaskType::Search),
            iterations: 3,
            next: None,
        })
        .with_start("repeat");
    context.chains().register_chain(chain);

    let result = context.chains().execute_chain("c1").await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Completed);
    for i in 0..3 {
        assert!(result.node_results.contains_key(&format!("repeat-loop-{i}")));
    }
}

#[tokio::test]
async fn test_task_failure_halts_chain() {
    let context = context_with(serde_json::json!({"ok": true}));
    let failing = ChainNode::Task {
        id: "boom".to_string(),
        task: Task::new("task-boom", "boom", TaskType::Search)
            .with_param("fail", serde_json::json!(true)),
        next: Some("never".to_string()),
    };
    let chain = TaskChain::new("c1", "failing")
        .with_node(failing)
        .with_node(task_node("never", None))
        .with_start("boom");
    context.chains().register_chain(chain);

    let result = context.chains().execute_chain("c1").await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("boom"));
    assert!(!result.node_results.contains_key("never"));
}

#[tokio::test]
async fn test_node_cap_guards_against_cycles() {
    let context = context_with(serde_json::json!({"ok": true}));
    // Malformed definition: the node loops back to itself forever
    let chain = TaskChain::new("c1", "cyclic")
        .with_node(task_node("spin", Some("spin")))
        .with_start("spin");
    context.chains().register_chain(chain);

    let result = context.chains().execute_chain("c1").await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("visited nodes"));
    assert_eq!(result.execution_path.len(), 100);
}

#[tokio::test]
async fn test_unknown_chain_errors() {
    let context = context_with(serde_json::json!({}));
    assert!(context.chains().execute_chain("missing").await.is_err());
}

#[tokio::test]
async fn test_search_analysis_template_runs_both_nodes() {
    // Search result carries a `results` field, so the Exists condition
    // routes into the analysis node
    let context = context_with(serde_json::json!({"results": [1, 2]}));
    let chain = search_analysis_chain("orchestration notes");
    let chain_id = chain.id.clone();
    context.chains().register_chain(chain);

    let result = context.chains().execute_chain(&chain_id).await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(
        result.execution_path,
        vec!["search", "has-results", "analyze"]
    );
}
