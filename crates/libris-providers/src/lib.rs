//! Provider implementations for Libris
//!
//! Concrete adapters behind the domain ports: embedding providers, the
//! table stores and the four repositories over them, the LLM concept
//! extractor, the file-backed lexicon cache, and document loaders.
//!
//! Providers are constructed by the application container; nothing in this
//! crate is a singleton.

pub mod embedding;
pub mod extraction;
pub mod lexicon;
pub mod loader;
pub mod repository;
pub mod store;
