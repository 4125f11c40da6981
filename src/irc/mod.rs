//! IRC protocol layer: command and message model, line framing, and the
//! connection pump loops.

pub mod codec;
pub mod command;
pub mod connection;
pub mod error;
pub mod message;
pub mod pump;

pub use command::Command;
pub use message::Message;
