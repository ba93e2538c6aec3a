//! `listunpack` — unpack LISTSERV notebook `.log` archives.
//!
//! This crate provides the core library for segmenting archive logs into
//! message transcripts, parsing each transcript into a MIME part tree,
//! extracting decoded parts to disk, and indexing every message in a CSV
//! manifest.

pub mod error;
pub mod extract;
pub mod manifest;
pub mod model;
pub mod parser;
pub mod unpack;
