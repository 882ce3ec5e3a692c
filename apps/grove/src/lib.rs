//! # Grove Library
//!
//! This library exposes the Grove CLI modules for testing and integration.
//!
//! The main binary uses these modules through the `main.rs` entry point.

pub mod cli;
pub mod config;
pub mod error;

// Re-export grove_core for convenience
pub use grove_core;
