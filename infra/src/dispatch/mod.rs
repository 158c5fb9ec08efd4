//! Message dispatch implementations

mod console;
mod twilio;

pub use console::ConsoleDispatcher;
pub use twilio::{TwilioConfig, TwilioDispatcher};
