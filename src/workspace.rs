//! Open documents sharing one settings record

use anyhow::Result;

use crate::commands::Command;
use crate::config::{Settings, SettingsStore};
use crate::plugin::MathMarkers;
use crate::session::EditorSession;

/// An open document
pub struct OpenDocument {
    pub name: String,
    pub session: EditorSession,
}

pub struct Workspace {
    markers: MathMarkers,
    documents: Vec<OpenDocument>,
    active: Option<usize>,
}

impl Workspace {
    pub fn new(store: Box<dyn SettingsStore>) -> Result<Self> {
        Ok(Self {
            markers: MathMarkers::load(store)?,
            documents: Vec::new(),
            active: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        self.markers.settings()
    }

    /// Open a document and make it active. Returns its index.
    pub fn open(&mut self, name: impl Into<String>, text: &str) -> usize {
        let session = EditorSession::new(text, self.markers.settings());
        self.documents.push(OpenDocument {
            name: name.into(),
            session,
        });
        let index = self.documents.len() - 1;
        self.active = Some(index);
        index
    }

    pub fn documents(&self) -> &[OpenDocument] {
        &self.documents
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if index < self.documents.len() {
            self.active = Some(index);
            true
        } else {
            false
        }
    }

    pub fn active(&self) -> Option<&EditorSession> {
        self.active
            .and_then(|index| self.documents.get(index))
            .map(|doc| &doc.session)
    }

    pub fn active_mut(&mut self) -> Option<&mut EditorSession> {
        self.active
            .and_then(|index| self.documents.get_mut(index))
            .map(|doc| &mut doc.session)
    }

    /// Run a command. Returns how many documents changed.
    pub fn execute(&mut self, command: Command) -> usize {
        tracing::info!("Executing {}", command.def().name);
        match command {
            Command::CleanDocument => match self.active_mut() {
                Some(session) => usize::from(session.clean()),
                None => 0,
            },
            Command::CleanAllDocuments => self
                .documents
                .iter_mut()
                .map(|doc| doc.session.clean())
                .filter(|changed| *changed)
                .count(),
        }
    }

    /// Change settings, persist them, and apply them to every open document
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) -> Result<()> {
        self.markers.update_settings(f)?;
        self.propagate();
        Ok(())
    }

    pub fn reset_settings(&mut self) -> Result<()> {
        self.markers.reset_settings()?;
        self.propagate();
        Ok(())
    }

    fn propagate(&mut self) {
        let settings = self.markers.settings();
        for doc in &mut self.documents {
            doc.session.apply_settings(settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryStore;

    fn workspace() -> Workspace {
        Workspace::new(Box::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn test_clean_active_only() {
        let mut ws = workspace();
        ws.open("a.md", "${} a {}$");
        ws.open("b.md", "${} b {}$");
        ws.set_active(0);
        assert_eq!(ws.execute(Command::CleanDocument), 1);
        assert_eq!(ws.documents()[0].session.text(), "$a$");
        assert_eq!(ws.documents()[1].session.text(), "${} b {}$");
    }

    #[test]
    fn test_clean_all() {
        let mut ws = workspace();
        ws.open("a.md", "${} a {}$");
        ws.open("b.md", "plain");
        ws.open("c.md", "x ${} c {}$");
        assert_eq!(ws.execute(Command::CleanAllDocuments), 2);
        assert_eq!(ws.documents()[2].session.text(), "x $c$");
    }

    #[test]
    fn test_settings_reach_open_documents() {
        let mut ws = workspace();
        ws.open("a.md", "${} a {}$");
        assert_eq!(ws.active().unwrap().layer().decorations().len(), 2);
        ws.update_settings(|s| s.disable_decorations = true).unwrap();
        assert!(ws.active().unwrap().layer().decorations().is_empty());
        ws.reset_settings().unwrap();
        assert_eq!(ws.active().unwrap().layer().decorations().len(), 2);
    }
}
