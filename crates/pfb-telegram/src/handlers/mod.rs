//! Update handlers registered with the dispatcher.
//!
//! - `SearchHandler`: commands and free-text searches
//! - `NavigationHandler`: inline-keyboard button presses

mod callback;
mod message;
pub mod texts;

pub use callback::NavigationHandler;
pub use message::SearchHandler;

use crate::BotCommand;

/// Command menu registered with the platform.
pub fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Start the bot"),
        BotCommand::new("help", "Show help message"),
        BotCommand::new("about", "About this bot"),
        BotCommand::new("faq", "Frequently asked questions"),
        BotCommand::new("disclaimer", "Legal disclaimer"),
    ]
}
