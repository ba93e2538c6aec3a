//! Core data model for parsed messages and their part trees.

pub mod message;
