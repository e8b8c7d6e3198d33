use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use triage_backend::{ConsultEvent, ConsultStream};
use triage_core::{ModelClient, ModelError, ReplyStream};

/// Scripted model behavior for one streamed reply.
#[derive(Clone, Copy)]
pub enum Script {
    Chunk(&'static str),
    Fail(&'static str),
}

/// Test double in place of the live model: replays a fixed script and
/// records every prompt it was asked to stream.
pub struct MockModelClient {
    script: Vec<Script>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockModelClient {
    pub fn new(script: Vec<Script>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn stream_reply(&self, prompt: String) -> Result<ReplyStream, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt);

        let items: Vec<Result<String, ModelError>> = self
            .script
            .iter()
            .map(|step| match step {
                Script::Chunk(text) => Ok(text.to_string()),
                Script::Fail(message) => Err(ModelError::Provider(message.to_string())),
            })
            .collect();
        Ok(futures::stream::iter(items).boxed())
    }
}

pub async fn collect_events(mut stream: ConsultStream) -> Vec<ConsultEvent> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }
    events
}

/// Concatenated chunk text, the way a streaming caller would see it.
pub fn chunk_text(events: &[ConsultEvent]) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            ConsultEvent::Chunk(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

pub fn done_user_id(events: &[ConsultEvent]) -> Option<String> {
    events.iter().find_map(|event| match event {
        ConsultEvent::Done { user_id } => Some(user_id.clone()),
        _ => None,
    })
}
