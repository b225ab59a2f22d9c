//! Configuration of the synthetic test runner (`config.openstatus.yaml`)

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the test runner configuration
pub const DEFAULT_RUN_CONFIG: &str = "config.openstatus.yaml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub tests: TestsConfig,
}

/// Monitors triggered by `openstatus run`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestsConfig {
    #[serde(default)]
    pub ids: Vec<i64>,
}

/// Load configuration from a YAML file
pub fn load_run_config(path: &Path) -> crate::Result<RunConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            crate::OpenstatusError::ConfigNotFound(path.display().to_string())
        } else {
            crate::OpenstatusError::Config(format!("Failed to read config file {:?}: {}", path, e))
        }
    })?;
    if crate::desired::is_blank_document(&content) {
        return Ok(RunConfig::default());
    }
    let config: RunConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}
