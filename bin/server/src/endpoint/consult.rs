use std::{convert::Infallible, sync::Arc};

use axum::{
    body::{Body, Bytes},
    extract::{Json, State},
    http::{header, StatusCode},
    response::Response,
};
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use triage_backend::{ConsultError, ConsultEvent, ConsultRequest, ConsultService};

pub type SharedConsultService = Arc<ConsultService>;

/// Returns the first N words of a string for logging preview
fn first_n_words(s: &str, n: usize) -> String {
    s.split_whitespace()
        .take(n)
        .collect::<Vec<_>>()
        .join(" ")
}

pub async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct ConsultBody {
    symptoms: String,
    health_context: Option<String>,
    user_id: Option<String>,
}

pub async fn consult_endpoint(
    State(service): State<SharedConsultService>,
    Json(body): Json<ConsultBody>,
) -> Result<Response, StatusCode> {
    let preview = first_n_words(&body.symptoms, 3);
    info!(preview, "POST /api/consult");

    let stream = service
        .consult(ConsultRequest {
            symptoms: body.symptoms,
            health_context: body.health_context,
            user_id: body.user_id,
        })
        .await
        .map_err(|err| match err {
            ConsultError::Input(_) => StatusCode::BAD_REQUEST,
            ConsultError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ConsultError::Model(_) => StatusCode::BAD_GATEWAY,
        })?;

    // Drive the consult on its own task: a generation that completes is
    // persisted even when the caller disconnects mid-stream.
    let (sender, receiver) = mpsc::channel::<Bytes>(32);
    tokio::spawn(async move {
        let mut stream = stream;
        while let Some(event) = stream.next().await {
            let bytes = match event {
                ConsultEvent::Chunk(text) | ConsultEvent::Notice(text) => Bytes::from(text),
                ConsultEvent::Done { user_id } => {
                    Bytes::from(format!("\n\n--- USER_ID: {user_id} ---"))
                }
            };
            // A closed receiver means the caller went away; keep draining
            // so the entry still commits on completion.
            let _ = sender.send(bytes).await;
        }
    });

    let body = Body::from_stream(ReceiverStream::new(receiver).map(Ok::<_, Infallible>));
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
