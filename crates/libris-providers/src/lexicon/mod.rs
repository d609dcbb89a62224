//! Lexical ontology providers

mod file;

pub use file::FileLexicon;
