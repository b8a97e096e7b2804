//! Client for Google's Gemini chat models.
mod core;

pub use self::core::*;
