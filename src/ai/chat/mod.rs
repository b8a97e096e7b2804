pub mod core;
pub mod models;

pub use self::core::{Analysis, Reviewer};
pub use models::{Conversation, Role, Turn};
