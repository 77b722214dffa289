//! Message handling - Parsing updates and dispatching them to handlers

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{handler, Context, MessageDispatcher, Trigger};
pub use parser::MessageParser;
