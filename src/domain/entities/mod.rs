//! Domain entities - Core objects with no infrastructure dependencies

pub mod update;
pub mod message;
pub mod command;

pub use update::{Update, UpdateKind, User};
pub use message::{Message, Content};
pub use command::{Command, CommandCatalog};
