//! Settings lifecycle
//!
//! Loads the stored record once, writes it straight back so newly added keys
//! appear in the file, and saves after every mutation.

use anyhow::Result;

use crate::config::{Settings, SettingsStore};
use crate::keymap::Keystroke;

pub struct MathMarkers {
    settings: Settings,
    store: Box<dyn SettingsStore>,
}

impl MathMarkers {
    pub fn load(store: Box<dyn SettingsStore>) -> Result<Self> {
        let settings = match store.load() {
            Ok(Some(value)) => Settings::from_value(value),
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!("Failed to load settings, using defaults: {:#}", e);
                Settings::default()
            }
        };
        store.save(&settings.to_value())?;
        Ok(Self { settings, store })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutate the settings and persist them
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) -> Result<()> {
        f(&mut self.settings);
        self.store.save(&self.settings.to_value())
    }

    /// Restore defaults and persist them
    pub fn reset_settings(&mut self) -> Result<()> {
        self.update_settings(|settings| *settings = Settings::default())
    }

    pub fn add_deletion_key(&mut self, key: Keystroke) -> Result<bool> {
        let mut added = false;
        self.update_settings(|settings| added = settings.add_deletion_key(key))?;
        Ok(added)
    }

    pub fn remove_deletion_key(&mut self, key: &Keystroke) -> Result<bool> {
        let mut removed = false;
        self.update_settings(|settings| removed = settings.remove_deletion_key(key))?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;
    use crate::keymap::KeyCode;
    use serde_json::json;

    #[test]
    fn test_load_writes_back_defaults() {
        let store = MemoryStore::with_value(json!({ "disableInTables": false }));
        let markers = MathMarkers::load(Box::new(store.clone())).unwrap();
        assert!(!markers.settings().disable_in_tables);
        assert_eq!(store.saves(), 1);
        assert_eq!(store.value().unwrap()["disableDecorations"], json!(false));
    }

    #[test]
    fn test_every_mutation_saves() {
        let store = MemoryStore::new();
        let mut markers = MathMarkers::load(Box::new(store.clone())).unwrap();
        markers
            .update_settings(|s| s.disable_decorations = true)
            .unwrap();
        assert_eq!(store.value().unwrap()["disableDecorations"], json!(true));

        assert!(markers.add_deletion_key(Keystroke::key(KeyCode::Delete)).unwrap());
        assert!(!markers.add_deletion_key(Keystroke::key(KeyCode::Delete)).unwrap());
        assert_eq!(store.saves(), 4);

        markers.reset_settings().unwrap();
        assert_eq!(markers.settings(), &Settings::default());
        assert_eq!(store.value().unwrap(), Settings::default().to_value());
    }
}
