//! Application services - Handler registration, polling and supervision

pub mod command_service;
pub mod polling_service;
pub mod supervisor;

pub use command_service::CommandService;
pub use polling_service::{PollingClient, PollingOptions};
pub use supervisor::{Outcome, Supervisor};
