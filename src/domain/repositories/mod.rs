//! Repository traits (interfaces)
//!
//! These traits define the contracts for external dependencies.
//! They follow the Dependency Inversion Principle (DIP) from SOLID.

mod image_reader;
mod output_sink;

pub use image_reader::{ImageError, ImageReader};
pub use output_sink::{OutputHandle, OutputSink, OutputSinkError};
