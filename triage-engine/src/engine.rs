use std::sync::Arc;

use triage_vector::index::CaseIndex;

use crate::context;
use crate::error::EngineError;
use crate::inference::{Embedder, Generator};
use crate::prompt::{DeviceContext, PromptTemplate};
use crate::retriever::Retriever;

/// A single resolution request from the presentation shell.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub question: String,
    pub model_type: Option<String>,
    pub sw_version: Option<String>,
    pub components: Vec<String>,
    pub country: Option<String>,
    /// Max cases to retrieve; falls back to the engine default.
    pub k: Option<usize>,
}

/// Orchestrates retrieve → assemble → generate for one query.
///
/// Constructed once at process start with explicitly injected service
/// handles and a loaded index, then shared behind `Arc` for the life of
/// the process. All methods take `&self`; the index is read-mostly after
/// the startup load, so concurrent callers need no locking.
pub struct ResolverEngine {
    retriever: Retriever,
    generator: Arc<dyn Generator>,
    template: PromptTemplate,
    index: Arc<CaseIndex>,
    default_k: usize,
}

impl ResolverEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        index: Arc<CaseIndex>,
        template: PromptTemplate,
        default_k: usize,
    ) -> Self {
        Self {
            retriever: Retriever::new(embedder, Arc::clone(&index)),
            generator,
            template,
            index,
            default_k,
        }
    }

    pub fn case_count(&self) -> usize {
        self.index.len()
    }

    /// Answer one query: retrieve grounding cases, assemble the context,
    /// render the prompt, and invoke the generator. Returns the formatted
    /// answer ready for direct display.
    ///
    /// Zero retrieved cases is a valid path — the answer then
    /// acknowledges the absence of history. Any backend failure aborts
    /// with a typed error; retrieved context is discarded, no partial
    /// answer is returned.
    pub fn query(&self, request: &QueryRequest) -> Result<String, EngineError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(EngineError::Validation("question must not be empty".into()));
        }

        let k = request.k.unwrap_or(self.default_k);
        let hits = self.retriever.retrieve(
            question,
            request.model_type.as_deref(),
            request.sw_version.as_deref(),
            k,
        )?;
        tracing::debug!(hits = hits.len(), "Assembling grounding context");

        let assembled = context::assemble(&hits);
        let device = DeviceContext {
            model_type: request.model_type.clone(),
            sw_version: request.sw_version.clone(),
            components: request.components.clone(),
            country: request.country.clone(),
        };
        let prompt =
            self.template
                .render(question, &device, &assembled.context, &assembled.references);

        self.generator.generate(&prompt)
    }
}
