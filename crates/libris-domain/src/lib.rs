//! Domain layer for Libris
//!
//! Core business types for the corpus retrieval engine: the four-table data
//! model (catalog, chunks, concepts, categories), the ID and hash utilities
//! that key it, value objects exchanged between layers, the error hierarchy,
//! and the port traits implemented by the provider layer.
//!
//! This crate is pure: no I/O, no framework types, no clock access.

pub mod entities;
pub mod error;
pub mod ids;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
