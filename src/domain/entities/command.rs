use serde::Serialize;

/// Bot command metadata announced to Telegram via `setMyCommands`.
///
/// Purely descriptive: dispatch is decided by the handler registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    #[serde(rename = "command")]
    pub name: String,
    pub description: String,
}

impl Command {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Ordered command catalog
#[derive(Debug, Clone, Default)]
pub struct CommandCatalog {
    commands: Vec<Command>,
}

impl CommandCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.register(Command::new(name, description));
        self
    }

    /// Adds a command, replacing the description of an existing entry in place
    pub fn register(&mut self, command: Command) {
        match self.commands.iter_mut().find(|c| c.name == command.name) {
            Some(existing) => existing.description = command.description,
            None => self.commands.push(command),
        }
    }

    pub fn all(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
