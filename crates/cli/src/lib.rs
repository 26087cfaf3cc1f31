//! Interactive host for the fruit quality client.
pub mod command;
pub mod shell;
