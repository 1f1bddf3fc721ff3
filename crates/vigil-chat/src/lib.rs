//! Conversational engine for the monitoring assistant.
//!
//! [`ChatEngine`] wires the intent resolver, the health-data provider, and
//! the response generator into a single `handle_message` entry point; a
//! [`Session`] carries the per-conversation state between turns.

mod engine;
mod error;
mod response;
mod session;

pub use engine::ChatEngine;
pub use error::ChatError;
pub use response::ResponseGenerator;
pub use session::{ChatTurn, Role, Session};
