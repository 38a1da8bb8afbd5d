//! Conversation turns replayed to the chat and tutor models.

mod model;
mod repair;

pub use model::{ConversationTurn, Speaker};
pub use repair::{prepare_history, repair_history};
