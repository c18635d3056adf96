//! Commands exposed to the host's command palette

/// A workspace-level command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Remove every marker from the active document
    CleanDocument,
    /// Remove every marker from every open document
    CleanAllDocuments,
}

/// A command definition for the command palette
#[derive(Debug, Clone)]
pub struct CommandDef {
    pub id: Command,
    /// Stable identifier for bindings, e.g. `mathveil.clean`
    pub name: &'static str,
    pub label: &'static str,
}

const CLEAN_DOCUMENT: CommandDef = CommandDef {
    id: Command::CleanDocument,
    name: "mathveil.clean",
    label: "Clean up markers in this document",
};

const CLEAN_ALL_DOCUMENTS: CommandDef = CommandDef {
    id: Command::CleanAllDocuments,
    name: "mathveil.clean-all",
    label: "Clean up markers in all open documents",
};

/// Static registry of all available commands
pub static COMMANDS: &[CommandDef] = &[CLEAN_DOCUMENT, CLEAN_ALL_DOCUMENTS];

impl Command {
    /// Look a command up by its stable name
    pub fn from_name(name: &str) -> Option<Command> {
        COMMANDS
            .iter()
            .find(|def| def.name == name)
            .map(|def| def.id)
    }

    pub fn def(self) -> &'static CommandDef {
        match self {
            Command::CleanDocument => &CLEAN_DOCUMENT,
            Command::CleanAllDocuments => &CLEAN_ALL_DOCUMENTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_registered() {
        for id in [Command::CleanDocument, Command::CleanAllDocuments] {
            assert_eq!(id.def().id, id);
            assert_eq!(Command::from_name(id.def().name), Some(id));
        }
        assert_eq!(Command::from_name("mathveil.nope"), None);
    }

    #[test]
    fn test_def_matches_registry() {
        for def in COMMANDS {
            assert_eq!(def.id.def().name, def.name);
            assert_eq!(def.id.def().label, def.label);
        }
        assert_eq!(Command::CleanAllDocuments.def().name, "mathveil.clean-all");
    }
}
