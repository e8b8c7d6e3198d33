use anyhow::{bail, Context, Result};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const PAYMENT_HEADER: &str = "X-Payment";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment header missing")]
    Missing,
    #[error("payment rejected: {0}")]
    Rejected(&'static str),
}

/// Verify-and-authorize boundary for paid requests. Implementations only
/// see request headers, so alternate payment providers can be substituted
/// without touching the consult flow.
pub trait PaymentGate: Send + Sync {
    fn verify(&self, headers: &HeaderMap) -> Result<(), PaymentError>;
}

/// Accepts a request when its payment payload names the configured
/// recipient address. Settlement itself happens upstream.
pub struct RecipientGate {
    recipient: String,
}

impl RecipientGate {
    pub fn from_env() -> Result<Arc<Self>> {
        let recipient = std::env::var("PAYMENT_ADDRESS")
            .context("PAYMENT_ADDRESS must be set (payment recipient address)")?;
        let recipient = recipient.trim().to_string();
        if recipient.is_empty() {
            bail!("PAYMENT_ADDRESS must not be empty");
        }
        Ok(Arc::new(Self { recipient }))
    }

    #[cfg(test)]
    fn with_recipient(recipient: &str) -> Self {
        Self {
            recipient: recipient.to_string(),
        }
    }
}

impl PaymentGate for RecipientGate {
    fn verify(&self, headers: &HeaderMap) -> Result<(), PaymentError> {
        let payload = headers
            .get(PAYMENT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(PaymentError::Missing)?;

        if !payload.contains(&self.recipient) {
            return Err(PaymentError::Rejected(
                "payment is not addressed to this service",
            ));
        }
        Ok(())
    }
}

pub async fn payment_middleware(
    State(gate): State<Arc<dyn PaymentGate>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    match gate.verify(req.headers()) {
        Ok(()) => Ok(next.run(req).await),
        Err(PaymentError::Missing) => Err(StatusCode::PAYMENT_REQUIRED),
        Err(err) => {
            debug!(%err, "payment rejected");
            Err(StatusCode::FORBIDDEN)
        }
    }
}
