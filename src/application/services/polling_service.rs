//! Long-polling client: connect, announce commands, receive and dispatch

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::application::services::CommandService;
use crate::application::shutdown::ShutdownController;
use crate::domain::entities::{Update, UpdateKind};
use crate::domain::traits::{Bot, BotInfo};
use crate::infrastructure::config::BotConfig;

/// Receive loop settings
#[derive(Debug, Clone)]
pub struct PollingOptions {
    pub timeout_secs: u64,
    pub retry_delay: Duration,
    pub drop_pending_updates: bool,
    pub allowed_updates: Vec<UpdateKind>,
    /// How long in-flight handlers may run after the loop stops
    pub drain_timeout: Duration,
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retry_delay: Duration::from_secs(5),
            drop_pending_updates: true,
            allowed_updates: vec![UpdateKind::Message, UpdateKind::CallbackQuery],
            drain_timeout: Duration::from_secs(5),
        }
    }
}

impl PollingOptions {
    pub fn from_config(config: &BotConfig) -> Self {
        Self {
            timeout_secs: config.poll_timeout_secs,
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            drop_pending_updates: config.drop_pending_updates,
            ..Self::default()
        }
    }
}

pub struct PollingClient {
    bot: Arc<dyn Bot>,
    commands: CommandService,
    options: PollingOptions,
}

impl PollingClient {
    pub fn new(bot: Arc<dyn Bot>, commands: CommandService) -> Self {
        Self {
            bot,
            commands,
            options: PollingOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PollingOptions) -> Self {
        self.options = options;
        self
    }

    /// Connect and poll until `shutdown` is requested or a fatal error occurs
    pub async fn run(self, shutdown: ShutdownController) -> Result<(), BotError> {
        let info = tokio::select! {
            _ = shutdown.wait() => {
                tracing::info!("Shutdown requested while connecting");
                return Ok(());
            }
            connected = self.connect() => connected?,
        };

        let parser = MessageParser::new(self.commands.prefix()).with_bot_username(&info.username);
        let dispatcher = self.commands.dispatcher();
        let mut tasks = JoinSet::new();
        let mut offset: i64 = 0;

        tracing::info!("Starting message loop...");

        let result = loop {
            let polled = tokio::select! {
                _ = shutdown.wait() => break Ok(()),
                polled = self.bot.get_updates(offset, self.options.timeout_secs, &self.options.allowed_updates) => polled,
            };

            match polled {
                Ok(updates) => {
                    if !updates.is_empty() {
                        tracing::debug!("Received {} updates", updates.len());
                    }
                    offset = Update::next_offset(&updates, offset);
                    for update in &updates {
                        if let Some(message) = parser.parse_update(update) {
                            dispatcher.dispatch(message, self.bot.clone(), &mut tasks);
                        }
                    }
                }
                Err(e) if e.is_fatal() => break Err(e),
                Err(e) => {
                    tracing::error!("Failed to get updates: {}", e);
                    tokio::select! {
                        _ = shutdown.wait() => break Ok(()),
                        _ = tokio::time::sleep(self.options.retry_delay) => {}
                    }
                }
            }

            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = joined {
                    tracing::error!("Handler task failed: {}", e);
                }
            }
        };

        self.drain(&mut tasks).await;
        result
    }

    /// `getMe`, then `deleteWebhook`, then the command announcement
    async fn connect(&self) -> Result<BotInfo, BotError> {
        let info = self.bot.get_me().await?;
        tracing::info!("Bot started: {} (@{}, id {})", info.name, info.username, info.id);

        self.bot.delete_webhook(self.options.drop_pending_updates).await?;
        if self.options.drop_pending_updates {
            tracing::info!("Dropped pending updates");
        }

        self.announce_commands().await;
        Ok(info)
    }

    /// Best-effort `setMyCommands`
    async fn announce_commands(&self) {
        let catalog = self.commands.catalog();
        if catalog.is_empty() {
            return;
        }
        match self.bot.set_my_commands(catalog.all()).await {
            Ok(()) => tracing::info!("Bot commands set successfully"),
            Err(e) => tracing::warn!("Failed to set bot commands: {}", e),
        }
    }

    async fn drain(&self, tasks: &mut JoinSet<()>) {
        if tasks.is_empty() {
            return;
        }
        let drained = tokio::time::timeout(self.options.drain_timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            tracing::warn!("Aborting {} unfinished handlers", tasks.len());
            tasks.abort_all();
        }
    }
}
