use async_trait::async_trait;
use crate::domain::entities::{Command, Update, UpdateKind};
use crate::application::errors::BotError;

/// Bot trait - the slice of the messaging platform API the polling client uses
#[async_trait]
pub trait Bot: Send + Sync {
    /// Authenticate and fetch the bot's own identity
    async fn get_me(&self) -> Result<BotInfo, BotError>;

    /// Remove any webhook so long polling is allowed, optionally discarding
    /// updates queued before this session
    async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<(), BotError>;

    /// Long-poll for updates starting at `offset`
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
        allowed_updates: &[UpdateKind],
    ) -> Result<Vec<Update>, BotError>;

    /// Announce the command catalog
    async fn set_my_commands(&self, commands: &[Command]) -> Result<(), BotError>;

    /// Send a text message to a chat
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, BotError>;

    /// Answer a callback query
    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), BotError>;
}

/// Bot information
#[derive(Debug, Clone, Default)]
pub struct BotInfo {
    pub id: i64,
    pub name: String,
    pub username: String,
}
