use tracing::info;

use crate::{
    embeddings::{Embedder, HuggingFaceEmbedder},
    error::RagError,
    llm::{AzureCompletion, Completer},
    settings::Settings,
    vector_db::{MongoBackend, SearchBackend, VectorSearch},
};

/// Build the prompt handed to the language model.
pub fn build_prompt(query: &str, context: &str) -> String {
    format!("Query: {query}\nYou can have data from here: {context}")
}

/// Retrieval followed by generation, one stage after the other.
pub struct RagPipeline<E, B, C> {
    search: VectorSearch<E, B>,
    completer: C,
}

impl RagPipeline<HuggingFaceEmbedder, MongoBackend, AzureCompletion> {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            VectorSearch::new(
                HuggingFaceEmbedder::new(settings),
                MongoBackend::new(settings),
                settings.search.clone(),
            ),
            AzureCompletion::new(settings),
        )
    }
}

impl<E: Embedder, B: SearchBackend, C: Completer> RagPipeline<E, B, C> {
    pub fn new(search: VectorSearch<E, B>, completer: C) -> Self {
        Self { search, completer }
    }

    pub async fn answer(&self, query: &str) -> Result<String, RagError> {
        info!("Retrieving context for query: {query}");
        let context = self.search.query(query).await?;
        info!("Retrieved {} bytes of context", context.len());

        let prompt = build_prompt(query, &context);
        let answer = self.completer.complete(&prompt).await?;
        info!("Completion received");
        Ok(answer)
    }
}
