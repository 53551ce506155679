use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::debug;

use crate::{error::RagError, settings::Settings};

/// Turns text into a vector for the search index.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f64>, RagError>;
}

/// Hosted Hugging Face feature-extraction endpoint.
pub struct HuggingFaceEmbedder {
    client: Client,
    url: String,
    token: String,
}

impl HuggingFaceEmbedder {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: Client::new(),
            url: settings.hugging_face_model.clone(),
            token: settings.hugging_face_token.clone(),
        }
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    /// Single attempt; any status other than 200 fails with the status code
    /// and the response body.
    async fn embed(&self, text: &str) -> Result<Vec<f64>, RagError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&json!({ "inputs": text }))
            .send()
            .await
            .map_err(RagError::EmbeddingTransport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .map_err(RagError::EmbeddingTransport)?;
            return Err(RagError::EmbeddingRequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let vector: Vec<f64> = response
            .json()
            .await
            .map_err(RagError::EmbeddingTransport)?;
        debug!("Embedding has {} dimensions", vector.len());
        Ok(vector)
    }
}
