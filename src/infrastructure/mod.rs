//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Logging: Console and file output
//! - Adapters: Telegram Bot API client
//! - Health: Liveness HTTP server
//! - Process: Health server child process handle

pub mod config;
pub mod logging;
pub mod adapters;
pub mod health;
pub mod process;
