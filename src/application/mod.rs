//! Application layer - Use cases and orchestration
//!
//! This layer contains:
//! - Services: Handler registration, polling client, supervisor
//! - Errors: Error types for every component
//! - Messaging: Update parsing and dispatching
//! - Shutdown: Cooperative shutdown and signal handling

pub mod errors;
pub mod services;
pub mod messaging;
pub mod shutdown;
