/// Command definitions and Telegram event handlers
pub mod handlers;

pub use handlers::Command;
