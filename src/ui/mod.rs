//! Terminal UI: transcript, composer, slash commands, and the event loop.

pub mod app;
pub mod commands;
pub mod composer;
pub mod transcript;

pub use app::run;
