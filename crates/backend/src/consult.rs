use std::{pin::Pin, sync::Arc};

use chrono::Utc;
use futures::{Stream, StreamExt};
use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::entry::SessionEntry;
use crate::filter::filter_history;
use crate::store::{LogStore, StoreError};
use triage_core::{consultation_prompt, ModelClient, ModelError};

#[derive(Debug, Error)]
pub enum ConsultError {
    #[error("invalid input: {0}")]
    Input(&'static str),
    #[error(transparent)]
    Storage(#[from] StoreError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// One interaction request. `symptoms` is required; the identifier is
/// generated when absent.
#[derive(Debug, Clone, Default)]
pub struct ConsultRequest {
    pub symptoms: String,
    pub health_context: Option<String>,
    pub user_id: Option<String>,
}

/// Events relayed to the caller in production order.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsultEvent {
    /// Model output, relayed as it arrives.
    Chunk(String),
    /// Inline notice appended to the stream (errors, partial-output note).
    Notice(String),
    /// Terminal marker carrying the resolved identifier so a caller without
    /// a prior identifier can persist it.
    Done { user_id: String },
}

pub type ConsultStream = Pin<Box<dyn Stream<Item = ConsultEvent> + Send>>;

pub fn generate_user_id() -> String {
    Uuid::new_v4().to_string()
}

/// Drives one interaction end to end: resolve the identifier, load and
/// filter prior context, stream the model reply, and commit the entry once
/// the stream completes.
pub struct ConsultService {
    store: Arc<LogStore>,
    model: Arc<dyn ModelClient>,
}

impl ConsultService {
    pub fn new(store: Arc<LogStore>, model: Arc<dyn ModelClient>) -> Self {
        Self { store, model }
    }

    /// Validates the request, then returns the event stream for it.
    ///
    /// Errors returned here happened before any output was produced and map
    /// cleanly to a request-level failure: bad input, storage failure, or a
    /// model refusal to open the stream. Once the stream is open, failures
    /// arrive inline as `Notice` events and the entry is not committed.
    pub async fn consult(&self, request: ConsultRequest) -> Result<ConsultStream, ConsultError> {
        let symptoms = request.symptoms.trim().to_string();
        if symptoms.is_empty() {
            return Err(ConsultError::Input("symptoms must not be empty"));
        }

        let user_id = match request.user_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => {
                let id = generate_user_id();
                debug!(user_id = %id, "generated identifier for new user");
                id
            }
        };

        let raw_log = self.store.load(&user_id).await?;
        let prior_context = filter_history(&raw_log);

        let prompt = consultation_prompt(
            &prior_context,
            &symptoms,
            request.health_context.as_deref(),
        );

        let mut chunks = self.model.stream_reply(prompt).await?;

        let store = Arc::clone(&self.store);
        let health_context = request.health_context;

        let events = async_stream::stream! {
            let mut accumulated = String::new();

            while let Some(item) = chunks.next().await {
                match item {
                    Ok(text) => {
                        accumulated.push_str(&text);
                        yield ConsultEvent::Chunk(text);
                    }
                    Err(err) => {
                        error!(user_id, %err, "model stream failed mid-generation");
                        yield ConsultEvent::Notice(format!(
                            "\n\n[error] diagnosis stream failed: {err}"
                        ));
                        if !accumulated.is_empty() {
                            yield ConsultEvent::Notice(format!(
                                "\n[notice] partial output above ({} chars) was not recorded",
                                accumulated.len()
                            ));
                        }
                        // A partial generation must not pollute the log.
                        return;
                    }
                }
            }

            let entry = SessionEntry {
                timestamp: Utc::now(),
                symptoms,
                health_context,
                diagnosis: accumulated,
            };
            if let Err(err) = store.append(&user_id, &entry).await {
                error!(user_id, %err, "failed to append session entry");
                yield ConsultEvent::Notice(format!(
                    "\n\n[error] failed to record session: {err}"
                ));
            } else {
                info!(user_id, "recorded session entry");
            }

            yield ConsultEvent::Done { user_id };
        };

        Ok(events.boxed())
    }

    /// The user's full raw log, creating it on first access.
    pub async fn history(&self, user_id: &str) -> Result<String, StoreError> {
        self.store.load(user_id).await
    }
}
