//! In-memory `Bot` used by unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::application::errors::BotError;
use crate::domain::entities::{Command, Update, UpdateKind};
use crate::domain::traits::{Bot, BotInfo};

#[derive(Default)]
struct Recorded {
    drop_pending: Vec<bool>,
    allowed_updates: Vec<Vec<UpdateKind>>,
    offsets: Vec<i64>,
    commands: Vec<Command>,
    sent: Vec<(i64, String)>,
    callbacks: Vec<String>,
}

/// Records every call; `get_updates` hands out queued batches, then idles
/// like an empty long poll
#[derive(Default)]
pub struct MockBot {
    recorded: Mutex<Recorded>,
    batches: Mutex<VecDeque<Result<Vec<Update>, BotError>>>,
    get_me_error: Option<u16>,
    connect_delay: Option<Duration>,
    fail_set_commands: bool,
}

impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_token(mut self, code: u16) -> Self {
        self.get_me_error = Some(code);
        self
    }

    /// `getMe` takes this long to answer
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }

    pub fn failing_set_commands(mut self) -> Self {
        self.fail_set_commands = true;
        self
    }

    pub fn with_updates(self, json: &str) -> Self {
        let updates: Vec<Update> = serde_json::from_str(json).expect("invalid update json");
        self.batches.lock().unwrap().push_back(Ok(updates));
        self
    }

    pub fn with_poll_error(self, error: BotError) -> Self {
        self.batches.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn drop_pending_requests(&self) -> Vec<bool> {
        self.recorded.lock().unwrap().drop_pending.clone()
    }

    pub fn allowed_updates(&self) -> Vec<Vec<UpdateKind>> {
        self.recorded.lock().unwrap().allowed_updates.clone()
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.recorded.lock().unwrap().offsets.clone()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.recorded.lock().unwrap().commands.clone()
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.recorded.lock().unwrap().sent.clone()
    }

    pub fn callbacks(&self) -> Vec<String> {
        self.recorded.lock().unwrap().callbacks.clone()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn get_me(&self) -> Result<BotInfo, BotError> {
        if let Some(delay) = self.connect_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(code) = self.get_me_error {
            return Err(BotError::Api { code, description: "Unauthorized".to_string() });
        }
        Ok(BotInfo {
            id: 1,
            name: "BearTech".to_string(),
            username: "beartech_bot".to_string(),
        })
    }

    async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<(), BotError> {
        self.recorded.lock().unwrap().drop_pending.push(drop_pending_updates);
        Ok(())
    }

    async fn get_updates(
        &self,
        offset: i64,
        _timeout_secs: u64,
        allowed_updates: &[UpdateKind],
    ) -> Result<Vec<Update>, BotError> {
        {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.offsets.push(offset);
            recorded.allowed_updates.push(allowed_updates.to_vec());
        }
        let next = self.batches.lock().unwrap().pop_front();
        match next {
            Some(batch) => batch,
            None => {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(Vec::new())
            }
        }
    }

    async fn set_my_commands(&self, commands: &[Command]) -> Result<(), BotError> {
        if self.fail_set_commands {
            return Err(BotError::Network("connection reset".to_string()));
        }
        self.recorded.lock().unwrap().commands = commands.to_vec();
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, BotError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.sent.push((chat_id, text.to_string()));
        Ok(recorded.sent.len() as i64)
    }

    async fn answer_callback(&self, callback_id: &str, _text: Option<&str>) -> Result<(), BotError> {
        self.recorded.lock().unwrap().callbacks.push(callback_id.to_string());
        Ok(())
    }
}
