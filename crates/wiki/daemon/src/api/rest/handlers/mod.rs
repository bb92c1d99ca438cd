//! API request handlers

mod events;
mod health;
mod workflows;

pub use events::*;
pub use health::*;
pub use workflows::*;
