//! Snipforge CLI library
//!
//! Command implementations and snippet file loading for the `snipforge`
//! binary. Exposed as a library so integration tests can drive commands
//! without spawning the binary.

pub mod commands;
pub mod input;
