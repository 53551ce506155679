use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{error::RagError, settings::Settings};

/// Produces a chat completion for a single user message.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, content: &str) -> Result<String, RagError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Chat completions on an Azure OpenAI deployment.
pub struct AzureCompletion {
    client: Client,
    endpoint: String,
    key: String,
    deployment: String,
    api_version: String,
}

impl AzureCompletion {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: Client::new(),
            endpoint: settings.azure_openai_endpoint.clone(),
            key: settings.azure_openai_key.clone(),
            deployment: settings.completion.deployment.clone(),
            api_version: settings.completion.api_version.clone(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint.trim_end_matches('/'),
            self.deployment
        )
    }
}

#[async_trait]
impl Completer for AzureCompletion {
    async fn complete(&self, content: &str) -> Result<String, RagError> {
        let request = ChatRequest {
            model: &self.deployment,
            messages: [ChatMessage {
                role: "user",
                content,
            }],
        };

        info!("Requesting completion from deployment '{}'", self.deployment);
        let response = self
            .client
            .post(self.url())
            .query(&[("api-version", &self.api_version)])
            .header("api-key", &self.key)
            .json(&request)
            .send()
            .await
            .map_err(|e| failed(None, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| failed(Some(status.as_u16()), &e))?;
            return Err(failed(Some(status.as_u16()), &format!("{status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| failed(Some(status.as_u16()), &e))?;
        debug!("Completion returned {} choices", body.choices.len());

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| failed(Some(status.as_u16()), &"response has no message content"))
    }
}

fn failed(status: Option<u16>, cause: &dyn std::fmt::Display) -> RagError {
    RagError::CompletionRequestFailed {
        status,
        cause: cause.to_string(),
    }
}
