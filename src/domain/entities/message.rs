use super::User;
use chrono::{DateTime, Utc};

/// Type of message content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Text,
    Command,
    Callback,
    Other,
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            MessageType::Text => "text",
            MessageType::Command => "command",
            MessageType::Callback => "callback",
            MessageType::Other => "other",
        }
    }
}

/// Message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Command { name: String, args: Vec<String> },
    CallbackData(String),
    Empty,
}

impl Content {
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn command_name(&self) -> Option<&str> {
        match self {
            Content::Command { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Represents an incoming event after parsing
#[derive(Debug, Clone)]
pub struct Message {
    pub update_id: i64,
    pub chat_id: i64,
    pub sender: Option<User>,
    pub content: Content,
    pub message_type: MessageType,
    pub timestamp: DateTime<Utc>,
    /// Set for callback queries, needed to acknowledge them
    pub callback_id: Option<String>,
}

impl Message {
    pub fn new(chat_id: i64, content: Content) -> Self {
        let message_type = match &content {
            Content::Text(_) => MessageType::Text,
            Content::Command { .. } => MessageType::Command,
            Content::CallbackData(_) => MessageType::Callback,
            Content::Empty => MessageType::Other,
        };
        Self {
            update_id: 0,
            chat_id,
            sender: None,
            content,
            message_type,
            timestamp: Utc::now(),
            callback_id: None,
        }
    }

    pub fn from_text(chat_id: i64, text: impl Into<String>) -> Self {
        Self::new(chat_id, Content::Text(text.into()))
    }

    pub fn from_command(chat_id: i64, name: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(chat_id, Content::Command { name: name.into(), args })
    }

    pub fn with_sender(mut self, user: Option<User>) -> Self {
        self.sender = user;
        self
    }

    pub fn with_update_id(mut self, update_id: i64) -> Self {
        self.update_id = update_id;
        self
    }

    pub fn with_timestamp(mut self, unix_seconds: i64) -> Self {
        if let Some(ts) = DateTime::from_timestamp(unix_seconds, 0) {
            self.timestamp = ts;
        }
        self
    }

    pub fn with_callback_id(mut self, id: impl Into<String>) -> Self {
        self.callback_id = Some(id.into());
        self
    }
}
