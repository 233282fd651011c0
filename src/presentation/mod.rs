//! Presentation layer
//!
//! The command-line entry point that drives the application use cases.

pub mod cli;
