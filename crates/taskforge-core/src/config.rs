use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::error::TaskForgeError;
use crate::monitor::ResourceMonitorConfig;
use crate::orchestrator::OrchestratorConfig;

const DEFAULT_CONFIG_PATH: &str = "taskforge.toml";
const CONFIG_PATH_ENV: &str = "TASKFORGE_CONFIG";

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub monitor: ResourceMonitorConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Helper to load configuration with validation guard rails.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a provided path or discoverable defaults.
    ///
    /// Resolution order:
    /// 1. Explicit `path` argument.
    /// 2. `TASKFORGE_CONFIG` environment variable.
    /// 3. `taskforge.toml` in the current working directory.
    pub fn load(path: Option<PathBuf>) -> Result<Settings, TaskForgeError> {
        let candidate = resolve_path(path);
        let raw = fs::read_to_string(&candidate)
            .map_err(|err| TaskForgeError::config_io(candidate.clone(), err))?;
        let settings: Settings = toml::from_str(&raw)
            .map_err(|err| TaskForgeError::InvalidConfiguration(err.to_string()))?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    fn validate(settings: &Settings) -> Result<(), TaskForgeError> {
        let monitor = &settings.monitor;
        for (name, threshold) in [
            ("monitor.cpu_threshold", monitor.cpu_threshold),
            ("monitor.memory_threshold", monitor.memory_threshold),
        ] {
            if !(0.0..=1.0).contains(&threshold) || threshold == 0.0 {
                return Err(TaskForgeError::InvalidConfiguration(format!(
                    "{name} must be within (0, 1], got {threshold}"
                )));
            }
        }

        if monitor.min_concurrent_tasks == 0 {
            return Err(TaskForgeError::InvalidConfiguration(
                "monitor.min_concurrent_tasks must be at least 1".into(),
            ));
        }
        if monitor.min_concurrent_tasks > monitor.max_concurrent_tasks {
            return Err(TaskForgeError::InvalidConfiguration(format!(
                "monitor.min_concurrent_tasks ({}) exceeds max_concurrent_tasks ({})",
                monitor.min_concurrent_tasks, monitor.max_concurrent_tasks
            )));
        }

        if let Some(cap) = settings.orchestrator.global_max_concurrent_tasks
            && cap == 0
        {
            return Err(TaskForgeError::InvalidConfiguration(
                "orchestrator.global_max_concurrent_tasks must be at least 1 when set".into(),
            ));
        }

        if settings.logging.level.trim().is_empty() {
            return Err(TaskForgeError::InvalidConfiguration(
                "logging.level must not be empty".into(),
            ));
        }

        Ok(())
    }
}

fn resolve_path(path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = path {
        return path;
    }

    if let Ok(from_env) = env::var(CONFIG_PATH_ENV)
        && !from_env.trim().is_empty()
    {
        return PathBuf::from(from_env);
    }

    Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
}
