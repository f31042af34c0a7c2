//! Tile behaviour scripts
//!
//! Maps integer behaviour codes to compiled scripts. The table is read
//! once from a JSON resource:
//!
//! ```json
//! [{ "index": 12, "script": { "source": "behaviours.txt", "id": "ledge" } }]
//! ```

use crate::error::{Result, ScriptError};
use crate::script::{Script, ScriptDef};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct BehaviourEntry {
    index: i64,
    script: ScriptDef,
}

/// Behaviour code to script mapping
#[derive(Debug, Default, Clone)]
pub struct BehaviourTable {
    scripts: HashMap<i64, Arc<Script>>,
}

impl BehaviourTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a behaviour resource; script sources are relative to `data_path`
    pub fn load(path: &Path, data_path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ScriptError::io(path, e))?;
        let entries: Vec<BehaviourEntry> =
            serde_json::from_str(&text).map_err(|e| ScriptError::resource(path, e.to_string()))?;

        let mut table = Self::new();
        for entry in entries {
            if table.scripts.contains_key(&entry.index) {
                return Err(ScriptError::resource(
                    path,
                    format!("duplicate behaviour index {}", entry.index),
                ));
            }
            let script = Script::load(&entry.script, data_path)?;
            table.insert(entry.index, script);
        }

        tracing::info!("Loaded {} behaviours from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn insert(&mut self, code: i64, script: Script) {
        self.scripts.insert(code, Arc::new(script));
    }

    pub fn get(&self, code: i64) -> Option<&Arc<Script>> {
        self.scripts.get(&code)
    }

    /// Every loaded script, in no particular order
    pub fn scripts(&self) -> impl Iterator<Item = &Arc<Script>> {
        self.scripts.values()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
