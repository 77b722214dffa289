//! Domain layer - Core types with no infrastructure dependencies
//!
//! This layer contains:
//! - Entities: Telegram updates, parsed messages, the command catalog
//! - Traits: Abstractions for infrastructure (Bot)

pub mod entities;
pub mod traits;
