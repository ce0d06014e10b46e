//! Application layer: the headless command front end over a [`TreeStore`].
//!
//! [`TreeStore`]: crate::kernel::TreeStore

pub mod commands;

pub use commands::{execute, Command, CommandError};
