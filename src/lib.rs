//! Bolt Responder: email intent classification and reply drafting.

pub mod classifier;
pub mod config;
pub mod error;
pub mod labels;
pub mod llm;
pub mod responder;
pub mod server;
