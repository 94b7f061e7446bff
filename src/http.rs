//! HTTP transport.
//!
//! Every path and method reaches the same handler. The response is always
//! `200 OK` with a plain-text body of `Ok` or `Failed`, so the status line
//! carries no information about why a request failed.

use crate::handler::{Acknowledgement, IngestHandler};
use crate::storage::UpsertStore;
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{
        HeaderMap, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use log::debug;
use std::sync::Arc;
use tokio::net::TcpListener;

const MAX_HTTP_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Build the router for a handler.
pub fn router<S: UpsertStore + 'static>(handler: Arc<IngestHandler<S>>) -> Router {
    Router::new().fallback(dispatch::<S>).with_state(handler)
}

/// Serve requests on an already bound listener until the server stops.
pub async fn serve<S: UpsertStore + 'static>(
    listener: TcpListener,
    handler: Arc<IngestHandler<S>>,
) -> std::io::Result<()> {
    axum::serve(listener, router(handler)).await
}

async fn dispatch<S: UpsertStore + 'static>(
    State(handler): State<Arc<IngestHandler<S>>>,
    request: Request<Body>,
) -> Response {
    let authorization = authorization(request.headers()).to_string();

    let ack = match to_bytes(request.into_body(), MAX_HTTP_BODY_BYTES).await {
        Ok(body) => handler.handle(&authorization, &body).await,
        Err(err) => {
            debug!("request body error: {err}");
            Acknowledgement::Failed
        }
    };

    acknowledge(ack)
}

/// Raw `Authorization` header value; empty when absent or not valid text.
fn authorization(headers: &HeaderMap) -> &str {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn acknowledge(ack: Acknowledgement) -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        ack.as_str(),
    )
        .into_response()
}
