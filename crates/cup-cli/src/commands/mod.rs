//! Subcommand implementations.

pub mod detect;
pub mod info;
pub mod simulate;
pub mod sweep;
