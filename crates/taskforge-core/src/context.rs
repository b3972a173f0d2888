//! Composition root.
//!
//! One [`OrchestratorContext`] wires the registry, store, analytics,
//! messaging, monitor and scheduler together. It is constructed once at
//! process start and handed around by reference; there are no module-level
//! singletons or hidden re-initialisation paths.

use crate::a2a::A2aManager;
use crate::analyzer::ExecutionAnalyzer;
use crate::chain::ChainRunner;
use crate::monitor::{ResourceMonitor, ResourceMonitorConfig};
use crate::orchestrator::{AgentOrchestrator, OrchestratorConfig};
use crate::predictor::ExecutionTimePredictor;
use crate::registry::AgentRegistry;
use crate::store::{ExecutionStore, InMemoryExecutionStore};
use std::sync::Arc;
use tracing::info;

/// All engine components, built once and shared.
pub struct OrchestratorContext {
    registry: Arc<AgentRegistry>,
    store: Arc<dyn ExecutionStore>,
    predictor: Arc<ExecutionTimePredictor>,
    analyzer: Arc<ExecutionAnalyzer>,
    a2a: Arc<A2aManager>,
    monitor: Arc<ResourceMonitor>,
    orchestrator: Arc<AgentOrchestrator>,
    chains: Arc<ChainRunner>,
}

impl OrchestratorContext {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn ExecutionStore> {
        &self.store
    }

    pub fn predictor(&self) -> &Arc<ExecutionTimePredictor> {
        &self.predictor
    }

    pub fn analyzer(&self) -> &Arc<ExecutionAnalyzer> {
        &self.analyzer
    }

    pub fn a2a(&self) -> &Arc<A2aManager> {
        &self.a2a
    }

    pub fn monitor(&self) -> &Arc<ResourceMonitor> {
        &self.monitor
    }

    pub fn orchestrator(&self) -> &Arc<AgentOrchestrator> {
        &self.orchestrator
    }

    pub fn chains(&self) -> &Arc<ChainRunner> {
        &self.chains
    }

    /// Start resource sampling and let recommendations drive the global
    /// concurrency cap. The monitor talks to the orchestrator only through
    /// `set_global_concurrency`, never into its queues.
    pub fn enable_dynamic_scaling(&self) {
        if !self.orchestrator.current_config().enable_dynamic_adjustment {
            info!("dynamic adjustment disabled by configuration");
            return;
        }

        let orchestrator = self.orchestrator.clone();
        let monitor = self.monitor.clone();
        self.monitor.clone().start(move |_usage| {
            let orchestrator = orchestrator.clone();
            let monitor = monitor.clone();
            tokio::spawn(async move {
                let current = orchestrator
                    .current_config()
                    .global_max_concurrent_tasks
                    .unwrap_or_else(|| monitor.current_config().max_concurrent_tasks);
                let recommended = monitor.recommended_concurrency(current);
                if recommended != current {
                    orchestrator.set_global_concurrency(recommended).await;
                }
            });
        });
        info!("dynamic concurrency scaling enabled");
    }

    /// Stop background activity. Safe to call more than once.
    pub fn shutdown(&self) {
        self.monitor.stop();
        info!("orchestrator context shut down");
    }
}

/// Builds an [`OrchestratorContext`] with optional overrides.
#[derive(Default)]
pub struct ContextBuilder {
    store: Option<Arc<dyn ExecutionStore>>,
    orchestrator_config: Option<OrchestratorConfig>,
    monitor_config: Option<ResourceMonitorConfig>,
}

impl ContextBuilder {
    pub fn with_store(mut self, store: Arc<dyn ExecutionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_orchestrator_config(mut self, config: OrchestratorConfig) -> Self {
        self.orchestrator_config = Some(config);
        self
    }

    pub fn with_monitor_config(mut self, config: ResourceMonitorConfig) -> Self {
        self.monitor_config = Some(config);
        self
    }

    pub fn build(self) -> OrchestratorContext {
        let registry = Arc::new(AgentRegistry::new());
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryExecutionStore::new()));
        let predictor = Arc::new(ExecutionTimePredictor::new(store.clone()));
        let analyzer = Arc::new(ExecutionAnalyzer::new(store.clone()));
        let a2a = Arc::new(A2aManager::new(registry.clone()));
        let monitor = Arc::new(ResourceMonitor::new(
            self.monitor_config.unwrap_or_default(),
        ));
        let orchestrator = Arc::new(AgentOrchestrator::new(
            registry.clone(),
            store.clone(),
            predictor.clone(),
            analyzer.clone(),
            a2a.clone(),
            self.orchestrator_config.unwrap_or_default(),
        ));
        let chains = Arc::new(ChainRunner::new(orchestrator.clone()));

        OrchestratorContext {
            registry,
            store,
            predictor,
            analyzer,
            a2a,
            monitor,
            orchestrator,
            chains,
        }
    }
}
