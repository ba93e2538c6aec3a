//! Parsing: log-file segmentation, transcript parsing, and header handling.

pub mod header;
pub mod segment;
pub mod transcript;
