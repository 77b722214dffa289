//! Supervisor: starts the health child, runs the polling client, cleans up
//!
//! Shutdown of the child always happens, whichever way the polling client
//! ends. No component is ever restarted.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::services::{CommandService, PollingClient, PollingOptions};
use crate::application::shutdown::{listen_for_signals, ShutdownController};
use crate::domain::traits::Bot;
use crate::infrastructure::adapters::telegram::TelegramAdapter;
use crate::infrastructure::config::{BotConfig, Config};
use crate::infrastructure::process::{HealthCommand, HealthProcess};

/// How a supervised run ended
#[derive(Debug)]
pub enum Outcome {
    /// The polling client returned on its own
    Stopped,
    /// An interrupt or termination signal ended the run
    Interrupted,
    /// Required configuration was missing; nothing was started
    Misconfigured(Vec<String>),
    /// The polling client failed
    Failed(BotError),
}

impl Outcome {
    /// 0 for a clean stop, 1 for a polling failure, 2 for bad configuration
    pub fn code(&self) -> u8 {
        match self {
            Outcome::Stopped | Outcome::Interrupted => 0,
            Outcome::Failed(_) => 1,
            Outcome::Misconfigured(_) => 2,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Stopped => write!(f, "polling stopped"),
            Outcome::Interrupted => write!(f, "interrupted"),
            Outcome::Misconfigured(keys) => write!(f, "not started, missing {}", keys.join(", ")),
            Outcome::Failed(e) => write!(f, "polling failed: {}", e),
        }
    }
}

pub struct Supervisor {
    config: Config,
    commands: CommandService,
    config_path: Option<PathBuf>,
    health_command: Option<HealthCommand>,
    shutdown: ShutdownController,
    handle_signals: bool,
}

impl Supervisor {
    pub fn new(config: Config, commands: CommandService) -> Self {
        Self {
            config,
            commands,
            config_path: None,
            health_command: None,
            shutdown: ShutdownController::new(),
            handle_signals: true,
        }
    }

    /// Config file the health child should read, as given to this process
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Override how the health child is started (defaults to re-running this executable)
    #[cfg(test)]
    pub fn with_health_command(mut self, command: HealthCommand) -> Self {
        self.health_command = Some(command);
        self
    }

    /// Share a shutdown controller instead of only reacting to OS signals
    #[cfg(test)]
    pub fn with_shutdown(mut self, shutdown: ShutdownController, handle_signals: bool) -> Self {
        self.shutdown = shutdown;
        self.handle_signals = handle_signals;
        self
    }

    /// Run against the real Telegram Bot API
    pub async fn run(self) -> Outcome {
        self.run_with(|config: &BotConfig, token: String| -> Arc<dyn Bot> {
            Arc::new(TelegramAdapter::new(token).with_api_base(config.api_url.clone()))
        })
        .await
    }

    /// Run with the bot built by `connect`, called only once configuration is valid
    pub async fn run_with<F>(self, connect: F) -> Outcome
    where
        F: FnOnce(&BotConfig, String) -> Arc<dyn Bot>,
    {
        tracing::info!("Starting {} in production mode...", self.config.bot.name);

        let token = match self.config.validate() {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("{}", e);
                return Outcome::Misconfigured(self.config.missing_keys());
            }
        };

        let signals = self.handle_signals.then(|| listen_for_signals(self.shutdown.clone()));
        let health = self.start_health();

        let bot = connect(&self.config.bot, token);
        let client = PollingClient::new(bot, self.commands.clone())
            .with_options(PollingOptions::from_config(&self.config.bot));

        let outcome = match client.run(self.shutdown.clone()).await {
            Ok(()) if self.shutdown.is_shutdown_requested() => {
                tracing::info!("Shutting down...");
                Outcome::Interrupted
            }
            Ok(()) => Outcome::Stopped,
            Err(e) => {
                tracing::error!("Fatal error: {}", e);
                Outcome::Failed(e)
            }
        };

        if let Some(health) = health {
            tracing::info!("Stopping health server (pid {})", health.id().unwrap_or_default());
            if let Err(e) = health.shutdown(self.config.supervisor.shutdown_timeout()).await {
                tracing::error!("Failed to stop health server: {}", e);
            }
        }
        if let Some(signals) = signals {
            signals.abort();
        }

        outcome
    }

    /// Spawn the health child. A failure is logged and polling goes on without it.
    fn start_health(&self) -> Option<HealthProcess> {
        let command = match &self.health_command {
            Some(command) => Ok(command.clone()),
            None => HealthCommand::current_exe(self.config_path.as_deref(), self.config.health.port),
        };

        match command.and_then(|command| HealthProcess::spawn(&command)) {
            Ok(process) => Some(process),
            Err(e) => {
                tracing::error!("Health server not started: {}", e);
                None
            }
        }
    }
}
