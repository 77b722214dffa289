use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::messaging::{handler, Context, MessageDispatcher, Trigger};
use crate::domain::entities::CommandCatalog;

pub const START_REPLY: &str = "🤖 BearTech Token Analysis Bot is running!";
pub const HELP_REPLY: &str = "📊 Send a token contract address to analyze it.";
pub const ANALYZE_REPLY: &str = "🔍 Token analysis feature will be available soon!";

/// EVM contract address
static CONTRACT_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address regex"));

pub fn is_contract_address(text: &str) -> bool {
    CONTRACT_ADDRESS.is_match(text.trim())
}

/// Handler registration plus the command catalog announced to Telegram
#[derive(Clone)]
pub struct CommandService {
    dispatcher: MessageDispatcher,
    catalog: CommandCatalog,
    prefix: String,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            dispatcher: MessageDispatcher::new(),
            catalog: CommandCatalog::new(),
            prefix: prefix.into(),
        }
    }

    /// The BearTech token analysis bot
    pub fn beartech(prefix: impl Into<String>) -> Self {
        let mut service = Self::new(prefix);
        service.register_defaults();
        service
    }

    pub fn register_defaults(&mut self) {
        self.catalog = CommandCatalog::new()
            .with("start", "Start the bot and see welcome message")
            .with("help", "Show detailed help and usage instructions")
            .with("analyze", "Analyze a specific token contract address");

        self.dispatcher.command("start", |ctx: Context| async move { ctx.reply(START_REPLY).await });
        self.dispatcher.command("help", |ctx: Context| async move { ctx.reply(HELP_REPLY).await });
        self.dispatcher.command("analyze", |ctx: Context| async move { ctx.reply(ANALYZE_REPLY).await });

        // a bare address is an analyze request
        self.dispatcher.on(
            "contract-address",
            Trigger::text_matching(is_contract_address),
            handler(|ctx: Context| async move { ctx.reply(ANALYZE_REPLY).await }),
        );

        self.dispatcher.on(
            "callback",
            Trigger::Callback,
            handler(|ctx: Context| async move { ctx.answer_callback(None).await }),
        );
    }

    pub fn dispatcher(&self) -> &MessageDispatcher {
        &self.dispatcher
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Message;
    use crate::testing::MockBot;
    use std::sync::Arc;
    use tokio::task::JoinSet;

    async fn run(service: &CommandService, message: Message) -> Arc<MockBot> {
        let bot = Arc::new(MockBot::new());
        let mut tasks = JoinSet::new();
        service.dispatcher().dispatch(message, bot.clone(), &mut tasks);
        while tasks.join_next().await.is_some() {}
        bot
    }

    #[test]
    fn test_contract_address_detection() {
        assert!(is_contract_address("0x6B175474E89094C44Da98b954EedeAC495271d0F"));
        assert!(is_contract_address(" 0x6b175474e89094c44da98b954eedeac495271d0f\n"));
        assert!(!is_contract_address("0x6B17"));
        assert!(!is_contract_address("hello 0x6B175474E89094C44Da98b954EedeAC495271d0F"));
    }

    #[test]
    fn test_catalog_order() {
        let service = CommandService::beartech("/");
        let names: Vec<&str> = service.catalog().all().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["start", "help", "analyze"]);
        assert_eq!(service.catalog().all()[2].description, "Analyze a specific token contract address");
    }

    #[tokio::test]
    async fn test_start_reply() {
        let service = CommandService::beartech("/");
        let bot = run(&service, Message::from_command(5, "start", vec![])).await;
        assert_eq!(bot.sent(), vec![(5, START_REPLY.to_string())]);
    }

    #[tokio::test]
    async fn test_address_text_gets_analyze_reply() {
        let service = CommandService::beartech("/");
        let bot = run(
            &service,
            Message::from_text(5, "0x6B175474E89094C44Da98b954EedeAC495271d0F"),
        )
        .await;
        assert_eq!(bot.sent(), vec![(5, ANALYZE_REPLY.to_string())]);
    }

    #[tokio::test]
    async fn test_plain_text_is_ignored() {
        let service = CommandService::beartech("/");
        let bot = run(&service, Message::from_text(5, "gm")).await;
        assert!(bot.sent().is_empty());
    }

    #[tokio::test]
    async fn test_callback_is_answered() {
        let service = CommandService::beartech("/");
        let message = Message::new(5, crate::domain::entities::Content::CallbackData("x".to_string()))
            .with_callback_id("cb-9");
        let bot = run(&service, message).await;
        assert_eq!(bot.callbacks(), vec!["cb-9".to_string()]);
    }
}
