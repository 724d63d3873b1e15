//! Programmatic form of the `keysigner` binary's commands.
mod command;
mod runner;

pub use command::{Command, MessageInput};
pub use runner::{Outcome, run};
