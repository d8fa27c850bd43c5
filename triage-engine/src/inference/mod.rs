pub mod ollama;

use crate::error::EngineError;

/// Turns text into fixed-dimension vectors.
///
/// One provider instance, constructed at process start, serves both
/// indexing and querying — an index built with one embedding model is
/// invalid input for another.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one vector per input, in order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError>;

    /// Identifier of the backing model, recorded in the index manifest.
    fn model(&self) -> &str;
}

/// Produces the formatted answer from a fully rendered prompt.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, EngineError>;
}
