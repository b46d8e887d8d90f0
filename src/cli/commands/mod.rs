//! CLI command implementations
//!
//! Each module holds the argument types and the thin printing logic for one
//! group of commands; all chain work happens in the library.

pub mod chain;
pub mod stake;
pub mod stats;
pub mod subnet;
pub mod wallet;
