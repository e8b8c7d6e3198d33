use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use tracing::info;

use super::consult::SharedConsultService;

pub async fn history_endpoint(
    State(service): State<SharedConsultService>,
    Path(user_id): Path<String>,
) -> Result<Response, StatusCode> {
    info!(user_id, "GET /api/history");

    let log = service
        .history(&user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(log))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
