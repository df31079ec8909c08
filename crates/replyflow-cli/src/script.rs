//! Replay scripts: an ordered list of editor actions

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

/// One editor action
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Complete a step with raw data
    Complete {
        /// Step id
        step: String,
        /// Raw step data; an omitted `data` completes the step with no fields
        #[serde(default = "empty_object")]
        data: Value,
    },
    /// Merge a patch into a step's data
    Merge {
        /// Step id
        step: String,
        /// Partial step data
        patch: Value,
    },
    /// Cascade-delete a step
    Delete {
        /// Step id
        step: String,
    },
    /// Fetch the choices for a step
    Options {
        /// Step id
        step: String,
    },
    /// Assemble and submit
    Submit,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// A replay script
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    /// Free-form name shown in the summary
    #[serde(default)]
    pub name: Option<String>,

    /// Actions in replay order
    pub actions: Vec<ScriptAction>,
}

impl Script {
    /// Load a script, choosing the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&raw)
                .with_context(|| format!("Invalid JSON script {}", path.display())),
            Some("yaml") | Some("yml") => serde_yaml::from_str(&raw)
                .with_context(|| format!("Invalid YAML script {}", path.display())),
            other => bail!("Unsupported script extension: {:?}", other),
        }
    }
}
