//! System resource monitoring and concurrency recommendations.
//!
//! Samples process-wide CPU and memory usage on a fixed interval and, when
//! dynamic adjustment is enabled, recommends a new global concurrency cap:
//! shrink proportionally when usage breaches a threshold, grow by 20% when
//! comfortably under it, hold otherwise.

use serde::Deserialize;
use std::sync::{Arc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One usage sample, both ratios in 0-1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceUsage {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub timestamp: i64,
}

/// Monitor settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceMonitorConfig {
    #[serde(default = "ResourceMonitorConfig::default_enabled")]
    pub enable_dynamic_adjustment: bool,
    /// CPU ratio above which the cap shrinks
    #[serde(default = "ResourceMonitorConfig::default_threshold")]
    pub cpu_threshold: f64,
    /// Memory ratio above which the cap shrinks
    #[serde(default = "ResourceMonitorConfig::default_threshold")]
    pub memory_threshold: f64,
    #[serde(default = "ResourceMonitorConfig::default_interval_ms")]
    pub sample_interval_ms: u64,
    #[serde(default = "ResourceMonitorConfig::default_min_tasks")]
    pub min_concurrent_tasks: usize,
    #[serde(default = "ResourceMonitorConfig::default_max_tasks")]
    pub max_concurrent_tasks: usize,
}

impl ResourceMonitorConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_threshold() -> f64 {
        0.8
    }

    const fn default_interval_ms() -> u64 {
        5000
    }

    const fn default_min_tasks() -> usize {
        1
    }

    const fn default_max_tasks() -> usize {
        20
    }
}

impl Default for ResourceMonitorConfig {
    fn default() -> Self {
        Self {
            enable_dynamic_adjustment: Self::default_enabled(),
            cpu_threshold: Self::default_threshold(),
            memory_threshold: Self::default_threshold(),
            sample_interval_ms: Self::default_interval_ms(),
            min_concurrent_tasks: Self::default_min_tasks(),
            max_concurrent_tasks: Self::default_max_tasks(),
        }
    }
}

/// Samples system resources and recommends concurrency adjustments.
///
/// The monitor owns only its sampled state; it influences the orchestrator
/// exclusively through the caller-provided sample callback (wired to
/// `update_config` by the context), never by reaching into queues.
pub struct ResourceMonitor {
    config: RwLock<ResourceMonitorConfig>,
    current: RwLock<Option<ResourceUsage>>,
    system: Mutex<sysinfo::System>,
    sampler: Mutex<Option<JoinHandle<()>>>,
}

impl ResourceMonitor {
    pub fn new(config: ResourceMonitorConfig) -> Self {
        Self {
            config: RwLock::new(config),
            current: RwLock::new(None),
            system: Mutex::new(sysinfo::System::new()),
            sampler: Mutex::new(None),
        }
    }

    /// Take one sample immediately and remember it.
    pub fn sample(&self) -> ResourceUsage {
        let usage = {
            let mut sys = self.system.lock().expect("monitor system lock poisoned");
            sys.refresh_cpu();
            sys.refresh_memory();

            let cpu_count = sys.cpus().len().max(1);
            let cpu_usage = sys.cpus().iter().map(|c| c.cpu_usage()).sum::<f32>()
                / cpu_count as f32
                / 100.0;
            let total_memory = sys.total_memory().max(1);
            let memory_usage = sys.used_memory() as f64 / total_memory as f64;

            ResourceUsage {
                cpu_usage: f64::from(cpu_usage),
                memory_usage,
                timestamp: crate::now_ms(),
            }
        };

        *self.current.write().expect("monitor state lock poisoned") = Some(usage);
        usage
    }

    /// Start periodic sampling, invoking `on_sample` for every measurement.
    /// A second call replaces the previous sampling task.
    pub fn start<F>(self: Arc<Self>, on_sample: F)
    where
        F: Fn(ResourceUsage) + Send + Sync + 'static,
    {
        self.stop();

        let monitor = Arc::clone(&self);
        let interval_ms = monitor
            .config
            .read()
            .expect("monitor config lock poisoned")
            .sample_interval_ms;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_millis(interval_ms));
            loop {
                ticker.tick().await;
                let usage = monitor.sample();
                debug!(
                    cpu = usage.cpu_usage,
                    memory = usage.memory_usage,
                    "resource sample"
                );
                on_sample(usage);
            }
        });

        *self.sampler.lock().expect("monitor sampler lock poisoned") = Some(handle);
    }

    /// Stop periodic sampling. Idempotent.
    pub fn stop(&self) {
        if let Some(handle) = self
            .sampler
            .lock()
            .expect("monitor sampler lock poisoned")
            .take()
        {
            handle.abort();
        }
    }

    pub fn current_usage(&self) -> Option<ResourceUsage> {
        *self.current.read().expect("monitor state lock poisoned")
    }

    pub fn current_config(&self) -> ResourceMonitorConfig {
        self.config.read().expect("monitor config lock poisoned").clone()
    }

    /// Recommend a global concurrency cap given the current one.
    pub fn recommended_concurrency(&self, current_max: usize) -> usize {
        let config = self.config.read().expect("monitor config lock poisoned").clone();
        if !config.enable_dynamic_adjustment {
            return current_max;
        }
        let Some(usage) = self.current_usage() else {
            return current_max;
        };

        let over_cpu = usage.cpu_usage > config.cpu_threshold;
        let over_memory = usage.memory_usage > config.memory_threshold;

        if over_cpu || over_memory {
            let overload = (usage.cpu_usage / config.cpu_threshold)
                .max(usage.memory_usage / config.memory_threshold);
            let shrunk = ((current_max as f64) / overload).floor() as usize;
            return shrunk
                .max(config.min_concurrent_tasks)
                .min(config.max_concurrent_tasks);
        }

        if usage.cpu_usage < config.cpu_threshold * 0.7
            && usage.memory_usage < config.memory_threshold * 0.7
        {
            let grown = ((current_max as f64) * 1.2).ceil() as usize;
            return grown
                .min(config.max_concurrent_tasks)
                .max(config.min_concurrent_tasks);
        }

        current_max
    }

    pub fn update_config(&self, config: ResourceMonitorConfig) {
        if config.sample_interval_ms
            != self
                .config
                .read()
                .expect("monitor config lock poisoned")
                .sample_interval_ms
        {
            warn!("sample interval change takes effect on the next start()");
        }
        *self.config.write().expect("monitor config lock poisoned") = config;
    }

    #[cfg(test)]
    fn set_usage_for_test(&self, cpu: f64, memory: f64) {
        *self.current.write().unwrap() = Some(ResourceUsage {
            cpu_usage: cpu,
            memory_usage: memory,
            timestamp: crate::now_ms(),
        });
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new(ResourceMonitorConfig::default())
    }
}

impl Drop for ResourceMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
