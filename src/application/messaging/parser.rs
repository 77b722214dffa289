//! Message parser - Turns Telegram updates into structured messages

use crate::domain::entities::{Content, Message, Update};

/// Parses incoming updates into structured Message objects
pub struct MessageParser {
    command_prefix: String,
    bot_username: Option<String>,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
            bot_username: None,
        }
    }

    /// Commands addressed to another bot (`/start@other_bot`) are treated as text
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Parse an update. Returns `None` for update kinds that carry nothing to dispatch.
    pub fn parse_update(&self, update: &Update) -> Option<Message> {
        if let Some(msg) = &update.message {
            let message = match &msg.text {
                Some(text) => self.parse(msg.chat.id, text),
                None => Message::new(msg.chat.id, Content::Empty),
            };
            return Some(
                message
                    .with_update_id(update.update_id)
                    .with_sender(msg.from.clone())
                    .with_timestamp(msg.date),
            );
        }

        if let Some(cb) = &update.callback_query {
            // Inline keyboards on old messages may arrive without the message
            let chat_id = cb.message.as_ref().map_or(cb.from.id, |m| m.chat.id);
            let data = cb.data.clone().unwrap_or_default();
            return Some(
                Message::new(chat_id, Content::CallbackData(data))
                    .with_update_id(update.update_id)
                    .with_sender(Some(cb.from.clone()))
                    .with_callback_id(cb.id.clone()),
            );
        }

        None
    }

    /// Parse message text
    pub fn parse(&self, chat_id: i64, text: &str) -> Message {
        match self.parse_command(text) {
            Some((name, args)) => Message::from_command(chat_id, name, args),
            None => Message::from_text(chat_id, text),
        }
    }

    fn parse_command(&self, text: &str) -> Option<(String, Vec<String>)> {
        let cmd_text = text.strip_prefix(self.command_prefix.as_str())?;
        // the name must follow the prefix directly
        if !cmd_text.starts_with(|c: char| !c.is_whitespace()) {
            return None;
        }

        let mut parts = cmd_text.split_whitespace();
        let head = parts.next()?;
        let (name, target) = match head.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (head, None),
        };
        if name.is_empty() {
            return None;
        }

        if let (Some(target), Some(own)) = (target, &self.bot_username) {
            if !target.eq_ignore_ascii_case(own) {
                return None;
            }
        }

        Some((name.to_lowercase(), parts.map(|s| s.to_string()).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::message::MessageType;

    fn parser() -> MessageParser {
        MessageParser::new("/").with_bot_username("beartech_bot")
    }

    #[test]
    fn test_parse_command_with_args() {
        let msg = parser().parse(1, "/Analyze 0xabc extra");
        assert_eq!(
            msg.content,
            Content::Command {
                name: "analyze".to_string(),
                args: vec!["0xabc".to_string(), "extra".to_string()],
            }
        );
        assert_eq!(msg.message_type, MessageType::Command);
    }

    #[test]
    fn test_command_addressed_to_bot() {
        let msg = parser().parse(1, "/start@BearTech_Bot");
        assert_eq!(msg.content.command_name(), Some("start"));
    }

    #[test]
    fn test_command_for_other_bot_is_text() {
        let msg = parser().parse(1, "/start@other_bot");
        assert_eq!(msg.content, Content::Text("/start@other_bot".to_string()));
    }

    #[test]
    fn test_bare_prefix_is_text() {
        let msg = parser().parse(1, "/");
        assert_eq!(msg.message_type, MessageType::Text);
    }

    #[test]
    fn test_space_after_prefix_is_text() {
        for text in ["/ start", "/\thelp", "/ "] {
            let msg = parser().parse(1, text);
            assert_eq!(msg.content, Content::Text(text.to_string()), "{:?}", text);
        }
    }

    #[test]
    fn test_parse_callback_update() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 3,
                "callback_query": {
                    "id": "cb-1",
                    "from": {"id": 9, "is_bot": false, "first_name": "Bo"},
                    "message": {"message_id": 1, "chat": {"id": -100}, "date": 0},
                    "data": "refresh"
                }
            }"#,
        )
        .unwrap();

        let msg = parser().parse_update(&update).unwrap();
        assert_eq!(msg.chat_id, -100);
        assert_eq!(msg.callback_id.as_deref(), Some("cb-1"));
        assert_eq!(msg.content, Content::CallbackData("refresh".to_string()));
    }

    #[test]
    fn test_parse_empty_update() {
        let update: Update = serde_json::from_str(r#"{"update_id": 4}"#).unwrap();
        assert!(parser().parse_update(&update).is_none());
    }
}
