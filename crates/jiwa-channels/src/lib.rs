//! Channel implementations for the jiwa assistant.

pub mod cli;
mod line_editor;
mod preview;

pub use cli::CliChannel;
