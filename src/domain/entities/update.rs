//! Telegram Bot API update objects, as delivered by `getUpdates`

use serde::{Deserialize, Serialize};

/// Update kinds the polling client asks Telegram to deliver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Message,
    CallbackQuery,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// Next `getUpdates` offset that acknowledges every update in the batch
    pub fn next_offset(updates: &[Update], current: i64) -> i64 {
        updates
            .iter()
            .map(|u| u.update_id + 1)
            .max()
            .map_or(current, |next| next.max(current))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub date: i64,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<TelegramMessage>,
    pub data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_offset() {
        let updates: Vec<Update> = serde_json::from_str(
            r#"[{"update_id": 7}, {"update_id": 9}, {"update_id": 8}]"#,
        )
        .unwrap();

        assert_eq!(Update::next_offset(&updates, 0), 10);
        assert_eq!(Update::next_offset(&[], 42), 42);
    }

    #[test]
    fn test_deserialize_message_update() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 100,
                "message": {
                    "message_id": 5,
                    "from": {"id": 11, "is_bot": false, "first_name": "Ann", "username": "ann"},
                    "chat": {"id": 11, "type": "private"},
                    "date": 1700000000,
                    "text": "/start"
                }
            }"#,
        )
        .unwrap();

        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 11);
        assert_eq!(message.text.as_deref(), Some("/start"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn test_update_kind_serializes_as_api_name() {
        let kinds = vec![UpdateKind::Message, UpdateKind::CallbackQuery];
        assert_eq!(
            serde_json::to_string(&kinds).unwrap(),
            r#"["message","callback_query"]"#
        );
    }
}
