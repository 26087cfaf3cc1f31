//! Core library: session gate, prediction workflow, labels and rendering.

pub mod app;
pub mod config;
pub mod credentials;
pub mod labels;
pub mod models;
pub mod preview;
pub mod render;
pub mod session;
pub mod workflow;
