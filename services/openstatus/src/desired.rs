//! Loading the declared monitors from `openstatus.yaml`

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{OpenstatusError, Result};
use crate::model::MonitorSpec;
use crate::normalize::normalize_monitor;

/// Declared monitors keyed by the user-chosen monitor key
pub type DesiredState = BTreeMap<String, MonitorSpec>;

/// Load and normalize the desired state from a YAML file
///
/// A missing file or a document that does not match the monitor schema is
/// an error; nothing is defaulted for a malformed document.
pub fn load_desired_state(path: &Path) -> Result<DesiredState> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            OpenstatusError::ConfigNotFound(path.display().to_string())
        } else {
            OpenstatusError::Config(format!("Failed to read config file {:?}: {}", path, e))
        }
    })?;
    tracing::debug!("Loaded {} bytes from {:?}", content.len(), path);

    parse_desired_state(&content)
        .map_err(|e| match e {
            OpenstatusError::Config(reason) => {
                OpenstatusError::Config(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
}

/// Parse and normalize a desired-state document
pub fn parse_desired_state(content: &str) -> Result<DesiredState> {
    if is_blank_document(content) {
        return Ok(DesiredState::new());
    }

    let mut desired: DesiredState = serde_yaml::from_str(content)
        .map_err(|e| OpenstatusError::Config(format!("invalid monitor document: {}", e)))?;

    for (key, spec) in desired.iter_mut() {
        normalize_monitor(key, spec)?;
    }

    tracing::debug!("Parsed {} declared monitors", desired.len());
    Ok(desired)
}

/// Render a desired-state document, prefixed with the editor schema hint
pub fn render_desired_state(desired: &DesiredState) -> Result<String> {
    let body = serde_yaml::to_string(desired)?;
    Ok(format!("{}\n\n{}", SCHEMA_HEADER, body))
}

const SCHEMA_HEADER: &str =
    "# yaml-language-server: $schema=https://www.openstatus.dev/schema.json";

/// True for documents holding only whitespace and comments
pub(crate) fn is_blank_document(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}
