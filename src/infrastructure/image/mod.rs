//! Image reader implementations

mod file_image_reader;

pub use file_image_reader::FileImageReader;
