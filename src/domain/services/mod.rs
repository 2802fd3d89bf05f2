pub mod actions;
mod app_state;
mod bubble;
mod bubble_list;
mod chat_state;
pub mod events;
pub mod markdown;
mod preferences;
mod scroll;
mod settings;
mod sidebar;
mod themes;
mod transcript;

pub use app_state::*;
pub use bubble::*;
pub use bubble_list::*;
pub use chat_state::*;
pub use preferences::*;
pub use scroll::*;
pub use settings::*;
pub use sidebar::*;
pub use themes::*;
pub use transcript::*;
