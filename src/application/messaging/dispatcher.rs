//! Message dispatcher - Routes messages to the first matching handler

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::application::errors::BotError;
use crate::domain::entities::{Content, Message};
use crate::domain::traits::Bot;

/// Future returned by a handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Handler result
pub type HandlerResult = Result<(), BotError>;

/// Handler function type
pub type Handler = Arc<dyn Fn(Context) -> HandlerFuture + Send + Sync>;

/// Message-content predicate
pub type Predicate = Arc<dyn Fn(&Message) -> bool + Send + Sync>;

/// Wrap an async closure as a [`Handler`]
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |ctx| Box::pin(f(ctx)))
}

/// What a registration reacts to
#[derive(Clone)]
pub enum Trigger {
    /// A literal command name, compared case-insensitively
    Command(String),
    /// Any callback query (inline keyboard press)
    Callback,
    /// Any message accepted by the predicate
    Message(Predicate),
}

impl Trigger {
    pub fn command(name: impl Into<String>) -> Self {
        Trigger::Command(name.into().to_lowercase())
    }

    pub fn text_matching<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Trigger::Message(Arc::new(move |msg: &Message| {
            msg.content.text().is_some_and(&predicate)
        }))
    }

    pub fn matches(&self, message: &Message) -> bool {
        match self {
            Trigger::Command(name) => message.content.command_name() == Some(name.as_str()),
            Trigger::Callback => matches!(message.content, Content::CallbackData(_)),
            Trigger::Message(predicate) => predicate(message),
        }
    }
}

/// Everything a handler gets: the inbound event and a way back to the sender
#[derive(Clone)]
pub struct Context {
    pub message: Message,
    bot: Arc<dyn Bot>,
}

impl Context {
    pub fn new(message: Message, bot: Arc<dyn Bot>) -> Self {
        Self { message, bot }
    }

    /// Send a text reply to the chat the event came from
    pub async fn reply(&self, text: &str) -> HandlerResult {
        self.bot.send_message(self.message.chat_id, text).await?;
        Ok(())
    }

    /// Acknowledge a callback query. No-op for other events.
    pub async fn answer_callback(&self, text: Option<&str>) -> HandlerResult {
        if let Some(id) = &self.message.callback_id {
            self.bot.answer_callback(id, text).await?;
        }
        Ok(())
    }
}

#[derive(Clone)]
struct Route {
    name: String,
    trigger: Trigger,
    handler: Handler,
}

/// Ordered handler registration. The first matching trigger wins.
#[derive(Clone, Default)]
pub struct MessageDispatcher {
    routes: Vec<Route>,
}

impl MessageDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; `name` only shows up in logs
    pub fn on(&mut self, name: impl Into<String>, trigger: Trigger, handler: Handler) {
        self.routes.push(Route {
            name: name.into(),
            trigger,
            handler,
        });
    }

    /// Shorthand for a command trigger named after the command
    pub fn command<F, Fut>(&mut self, name: &str, f: F)
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.on(name, Trigger::command(name), handler(f));
    }

    /// Spawn the matching handler onto `tasks`. Returns false if nothing matched
    /// and the message was dropped.
    pub fn dispatch(&self, message: Message, bot: Arc<dyn Bot>, tasks: &mut JoinSet<()>) -> bool {
        let Some(route) = self.routes.iter().find(|r| r.trigger.matches(&message)) else {
            tracing::debug!(
                "No handler for {} update {} in chat {}",
                message.message_type.as_str(),
                message.update_id,
                message.chat_id
            );
            return false;
        };

        let sender = message
            .sender
            .as_ref()
            .and_then(|user| user.username.as_deref())
            .unwrap_or("unknown");
        tracing::debug!(
            "Dispatching update {} from {} ({}) to {}",
            message.update_id,
            sender,
            message.timestamp,
            route.name
        );
        let name = route.name.clone();
        let handler = route.handler.clone();
        let ctx = Context::new(message, bot);
        tasks.spawn(async move {
            if let Err(e) = handler(ctx).await {
                tracing::error!("Handler {} failed: {}", name, e);
            }
        });
        true
    }
}
