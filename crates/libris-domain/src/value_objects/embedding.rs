//! Semantic embedding value object

use serde::{Deserialize, Serialize};

/// A vector embedding of text content
///
/// The dimension `D` is fixed per deployment; every table stores vectors of
/// the same dimension, and the default hashing embedder produces unit-norm
/// vectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    /// The embedding vector values
    pub vector: Vec<f32>,
    /// Name of the model that generated this embedding
    pub model: String,
    /// Dimensionality of the embedding vector
    pub dimensions: usize,
}

impl Embedding {
    /// L2 norm of the vector
    pub fn norm(&self) -> f32 {
        self.vector.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}
