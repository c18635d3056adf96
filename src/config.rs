//! User settings and their persistence
//!
//! Settings are a flat JSON object stored in `~/.config/mathveil/settings.json`.
//! Keys missing from the stored object fall back to their defaults one by one,
//! so settings written by older versions keep loading.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::keymap::{KeyCode, Keystroke, Modifiers};

/// User-configurable behavior of the marker engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Keys that delete backward, in addition to whatever the host binds
    pub deletion_keys: Vec<Keystroke>,
    /// Leave transactions alone while the cursor is in a table
    pub disable_in_tables: bool,
    /// Leave transactions alone while the cursor is in a code block
    pub disable_in_code_blocks: bool,
    /// Skip marker insertion while an input method is composing
    pub disable_during_composition: bool,
    /// Show markers instead of hiding them
    pub disable_decorations: bool,
    /// Let the cursor enter markers
    pub disable_atomic_ranges: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deletion_keys: vec![
                Keystroke::key(KeyCode::Backspace),
                Keystroke::char_with_mods('h', Modifiers::CTRL),
            ],
            disable_in_tables: true,
            disable_in_code_blocks: true,
            disable_during_composition: true,
            disable_decorations: false,
            disable_atomic_ranges: false,
        }
    }
}

impl Settings {
    /// Read settings from a stored JSON value. Unreadable values give defaults.
    pub fn from_value(value: Value) -> Self {
        match serde_json::from_value(value) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to parse settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn is_deletion_key(&self, key: &Keystroke) -> bool {
        self.deletion_keys.contains(key)
    }

    /// Register a deletion key. Returns false if it was already there.
    pub fn add_deletion_key(&mut self, key: Keystroke) -> bool {
        if self.is_deletion_key(&key) {
            return false;
        }
        self.deletion_keys.push(key);
        true
    }

    /// Unregister a deletion key. Returns false if it was not there.
    pub fn remove_deletion_key(&mut self, key: &Keystroke) -> bool {
        let before = self.deletion_keys.len();
        self.deletion_keys.retain(|k| k != key);
        self.deletion_keys.len() != before
    }

    /// Set one field by its JSON key (`disableInTables`, ...). The value is
    /// parsed as JSON, so `true` and `["Backspace"]` both work.
    pub fn set_field(&mut self, key: &str, raw: &str) -> Result<()> {
        let value: Value = serde_json::from_str(raw)
            .with_context(|| format!("Value for {} is not valid JSON: {}", key, raw))?;
        let mut object = match self.to_value() {
            Value::Object(object) => object,
            _ => anyhow::bail!("Settings did not serialize to an object"),
        };
        if !object.contains_key(key) {
            anyhow::bail!("Unknown setting: {}", key);
        }
        object.insert(key.to_string(), value);
        *self = serde_json::from_value(Value::Object(object))
            .with_context(|| format!("Invalid value for {}", key))?;
        Ok(())
    }
}

/// Where settings are kept between runs
pub trait SettingsStore {
    /// The stored record, or `None` if nothing has been saved yet
    fn load(&self) -> Result<Option<Value>>;
    fn save(&self, value: &Value) -> Result<()>;
}

/// Settings kept in a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self) -> Result<Option<Value>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(Some(value))
    }

    fn save(&self, value: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        tracing::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// In-memory store. Clones share the same slot, so a test can keep one
/// handle and inspect what the other saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Rc<RefCell<Option<Value>>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: Value) -> Self {
        let store = Self::default();
        *store.value.borrow_mut() = Some(value);
        store
    }

    /// The last saved value
    pub fn value(&self) -> Option<Value> {
        self.value.borrow().clone()
    }

    /// How many times `save` was called
    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Value>> {
        Ok(self.value.borrow().clone())
    }

    fn save(&self, value: &Value) -> Result<()> {
        *self.value.borrow_mut() = Some(value.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
