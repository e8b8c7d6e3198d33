use std::{pin::Pin, sync::Arc};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use rig::{
    agent::Agent,
    client::CompletionClient,
    completion::Message,
    providers::anthropic,
    streaming::{StreamedAssistantContent, StreamingCompletion},
};
use thiserror::Error;
use tracing::warn;

const CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("CompletionError: {0}")]
    Completion(#[from] rig::completion::CompletionError),
    #[error("model credential missing: {0}")]
    Credential(&'static str),
    #[error("{0}")]
    Provider(String),
}

pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String, ModelError>> + Send>>;

/// Boundary to the external language model: a prompt in, a lazy finite
/// sequence of text chunks out. Alternate providers implement this without
/// the orchestrator caring.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn stream_reply(&self, prompt: String) -> Result<ReplyStream, ModelError>;
}

pub struct AnthropicModelClient {
    agent: Arc<Agent<anthropic::completion::CompletionModel>>,
}

impl AnthropicModelClient {
    /// Builds the client from `ANTHROPIC_API_KEY`. Absence is a startup
    /// error for the server binary, not something we fall back from.
    pub fn from_env(preamble: &str) -> Result<Self, ModelError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ModelError::Credential("ANTHROPIC_API_KEY"))?;
        let agent = anthropic::Client::new(&api_key)
            .agent(CLAUDE_MODEL)
            .preamble(preamble)
            .build();
        Ok(Self {
            agent: Arc::new(agent),
        })
    }
}

#[async_trait]
impl ModelClient for AnthropicModelClient {
    async fn stream_reply(&self, prompt: String) -> Result<ReplyStream, ModelError> {
        let agent = Arc::clone(&self.agent);

        let chunk_stream = async_stream::stream! {
            let request = match agent
                .stream_completion(Message::user(prompt), Vec::new())
                .await
            {
                Ok(request) => request,
                Err(err) => {
                    yield Err(ModelError::from(err));
                    return;
                }
            };

            let mut llm_stream = match request.stream().await {
                Ok(stream) => stream.fuse().boxed(),
                Err(err) => {
                    yield Err(ModelError::from(err));
                    return;
                }
            };

            while let Some(item) = llm_stream.next().await {
                match item {
                    Ok(StreamedAssistantContent::Text(text)) => yield Ok(text.text),
                    Ok(StreamedAssistantContent::Reasoning(reasoning)) => {
                        yield Ok(reasoning.reasoning)
                    }
                    Ok(StreamedAssistantContent::ToolCall(call)) => {
                        // No tools are registered for this agent.
                        warn!(name = %call.function.name, "ignoring unexpected tool call");
                    }
                    Ok(StreamedAssistantContent::Final(_)) => {}
                    Err(err) => {
                        yield Err(ModelError::from(err));
                        return;
                    }
                }
            }
        };

        Ok(chunk_stream.boxed())
    }
}
