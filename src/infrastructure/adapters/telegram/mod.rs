//! Telegram adapter

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::errors::BotError;
use crate::domain::entities::{Command, Update, UpdateKind};
use crate::domain::traits::{Bot, BotInfo};

/// Telegram API base URL
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Timeout for regular (non long-poll) requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack added on top of the long-poll timeout before giving up on getUpdates
const POLL_SLACK: Duration = Duration::from_secs(10);

/// Envelope every Bot API method responds with
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<u16>,
    description: Option<String>,
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    api_base: String,
    client: Client,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            client: Client::new(),
        }
    }

    /// Point the adapter at a different Bot API server (local bot API, tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Call a Bot API method and unwrap its result
    async fn call<Req, T>(&self, method: &str, request: &Req, timeout: Duration) -> Result<T, BotError>
    where
        Req: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client
            .post(self.api_url(method))
            .timeout(timeout)
            .json(request)
            .send()
            .await
            // the URL carries the token
            .map_err(|e| BotError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let data: ApiResponse<T> = response.json().await.map_err(|e| {
            if status.is_success() {
                BotError::Parse(e.without_url().to_string())
            } else {
                BotError::Api {
                    code: status.as_u16(),
                    description: status.canonical_reason().unwrap_or("unknown").to_string(),
                }
            }
        })?;

        if !data.ok {
            return Err(BotError::Api {
                code: data.error_code.unwrap_or(status.as_u16()),
                description: data.description.unwrap_or_default(),
            });
        }

        data.result
            .ok_or_else(|| BotError::Parse(format!("{} returned no result", method)))
    }
}

/// Decode one update. A malformed one keeps only its id so the offset still
/// moves past it.
fn parse_update(value: serde_json::Value) -> Option<Update> {
    let update_id = value.get("update_id").and_then(serde_json::Value::as_i64);
    match serde_json::from_value::<Update>(value) {
        Ok(update) => Some(update),
        Err(e) => {
            tracing::warn!("Skipping malformed update {:?}: {}", update_id, e);
            update_id.map(|update_id| Update {
                update_id,
                message: None,
                callback_query: None,
            })
        }
    }
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn get_me(&self) -> Result<BotInfo, BotError> {
        #[derive(Deserialize)]
        struct Me {
            id: i64,
            first_name: String,
            username: Option<String>,
        }

        let me: Me = self.call("getMe", &serde_json::json!({}), REQUEST_TIMEOUT).await?;
        Ok(BotInfo {
            id: me.id,
            name: me.first_name,
            username: me.username.unwrap_or_default(),
        })
    }

    async fn delete_webhook(&self, drop_pending_updates: bool) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct DeleteWebhookRequest {
            drop_pending_updates: bool,
        }

        let _: bool = self
            .call("deleteWebhook", &DeleteWebhookRequest { drop_pending_updates }, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }

    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
        allowed_updates: &[UpdateKind],
    ) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest<'a> {
            offset: i64,
            timeout: u64,
            allowed_updates: &'a [UpdateKind],
        }

        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates,
        };
        let timeout = Duration::from_secs(timeout_secs) + POLL_SLACK;
        let raw: Vec<serde_json::Value> = self.call("getUpdates", &request, timeout).await?;
        Ok(raw.into_iter().filter_map(parse_update).collect())
    }

    async fn set_my_commands(&self, commands: &[Command]) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct SetMyCommandsRequest<'a> {
            commands: &'a [Command],
        }

        let _: bool = self
            .call("setMyCommands", &SetMyCommandsRequest { commands }, REQUEST_TIMEOUT)
            .await?;
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<i64, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: i64,
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        tracing::debug!("Sending to {}: {}", chat_id, text);
        let sent: MessageResult = self
            .call("sendMessage", &SendMessageRequest { chat_id, text }, REQUEST_TIMEOUT)
            .await?;
        Ok(sent.message_id)
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<&str>) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct AnswerRequest<'a> {
            callback_query_id: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            text: Option<&'a str>,
        }

        let _: bool = self
            .call(
                "answerCallbackQuery",
                &AnswerRequest { callback_query_id: callback_id, text },
                REQUEST_TIMEOUT,
            )
            .await?;
        Ok(())
    }
}
