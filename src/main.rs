use clap::{Parser, Subcommand};
use std::path::Path;
use std::process::ExitCode;

mod domain;
mod application;
mod infrastructure;

#[cfg(test)]
mod testing;

use application::services::{CommandService, Supervisor};
use infrastructure::config::{Config, LoggingConfig};
use infrastructure::logging::{self, LogGuard};
use infrastructure::health;

#[derive(Parser)]
#[command(name = "beartech-bot")]
#[command(about = "BearTech token analysis bot with a health check server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (read only if it exists)
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,

    /// Bot token (overrides config and TELEGRAM_BOT_TOKEN)
    #[arg(short, long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot together with its health check server
    Run,
    /// Run only the health check server (what `run` starts as a child process)
    Health {
        /// Port to bind (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_bot(&cli.config, cli.token),
        Commands::Health { port } => run_health(&cli.config, port),
        Commands::Version => {
            println!("beartech-bot v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => init_config(),
    }
}

/// Load config (file, then environment) and start logging
fn prepare(config_path: &str) -> Result<(Config, LogGuard), ExitCode> {
    let (file_config, file_error) = if Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        }
    } else {
        (Config::default(), None)
    };

    match file_config.with_env(|key| std::env::var(key).ok()) {
        Ok(config) => {
            let guard = logging::init(&config.logging);
            if let Some(e) = file_error {
                tracing::warn!("Failed to load config: {}, using defaults", e);
            }
            Ok((config, guard))
        }
        Err(e) => {
            let _guard = logging::init(&LoggingConfig::default());
            tracing::error!("{}", e);
            Err(ExitCode::from(2))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, ExitCode> {
    tokio::runtime::Runtime::new().map_err(|e| {
        tracing::error!("Failed to start async runtime: {}", e);
        ExitCode::FAILURE
    })
}

fn run_bot(config_path: &str, token_override: Option<String>) -> ExitCode {
    let (mut config, _log) = match prepare(config_path) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };

    if let Some(token) = token_override {
        config.bot.token = Some(token);
    }

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    let commands = CommandService::beartech(config.bot.prefix.clone());
    let supervisor = Supervisor::new(config, commands).with_config_path(config_path);
    let outcome = rt.block_on(supervisor.run());
    tracing::info!("Exiting with code {}: {}", outcome.code(), outcome);
    outcome.exit_code()
}

fn run_health(config_path: &str, port: Option<u16>) -> ExitCode {
    let (mut config, _log) = match prepare(config_path) {
        Ok(prepared) => prepared,
        Err(code) => return code,
    };

    if let Some(port) = port {
        config.health.port = port;
    }

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };

    match rt.block_on(health::run(&config.health)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn init_config() -> ExitCode {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to render default config: {}", e);
            ExitCode::FAILURE
        }
    }
}
