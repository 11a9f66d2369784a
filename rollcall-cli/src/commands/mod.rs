//! Subcommand implementations.

pub mod attend;
pub mod clock;
pub mod enroll;
pub mod list;
pub mod remove;
