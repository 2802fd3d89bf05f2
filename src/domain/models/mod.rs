mod action;
mod api;
mod event;
mod loading;
mod message;
mod preferences;
mod session;
mod slash_commands;
mod storage;
mod textarea;

pub use action::*;
pub use api::*;
pub use event::*;
pub use loading::*;
pub use message::*;
pub use preferences::*;
pub use session::*;
pub use slash_commands::*;
pub use storage::*;
pub use textarea::*;
