//! CLI support for the `sift` binary.

pub mod args;
pub mod commands;
pub mod context;

pub use context::CommandContext;
