//! Output persistence implementations

mod local_output_sink;

pub use local_output_sink::LocalOutputSink;
