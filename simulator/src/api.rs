//! HTTP surface of the simulator.
//!
//! Serves both generations of the verification routes. Business failures
//! mirror the production backend's envelope: unknown codes are 404s,
//! state violations are 200s with `success: false`; the scanner client
//! treats both identically.

use crate::{Simulator, Verdict};
use aboor_types::{VerifyRequest, VerifyResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::debug;

pub struct Api {
    simulator: Arc<Simulator>,
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/tickets/verify-qr1", post(verify_qr1))
            .route("/api/tickets/switch-qr", post(verify_qr1))
            .route("/api/tickets/verify-qr2", post(verify_qr2))
            .route("/api/tickets/verify-secondary-qr", post(verify_qr2))
            .with_state(self.simulator.clone())
    }
}

fn respond(verdict: Verdict) -> Response {
    match verdict {
        Verdict::Accepted(ticket) => (
            StatusCode::OK,
            Json(VerifyResponse {
                success: true,
                data: Some(ticket),
                message: None,
                error: None,
            }),
        )
            .into_response(),
        Verdict::NotFound => failure(StatusCode::NOT_FOUND, "Invalid QR code"),
        Verdict::AlreadyUsed => failure(StatusCode::OK, "Ticket already used"),
        Verdict::NotSwitched => failure(StatusCode::OK, "Primary QR not verified"),
    }
}

fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(VerifyResponse {
            success: false,
            data: None,
            message: Some(message.to_string()),
            error: None,
        }),
    )
        .into_response()
}

async fn verify_qr1(
    State(simulator): State<Arc<Simulator>>,
    Json(request): Json<VerifyRequest>,
) -> Response {
    debug!(code = %request.qr_code, "primary verification request");
    respond(simulator.verify_primary(&request.qr_code))
}

async fn verify_qr2(
    State(simulator): State<Arc<Simulator>>,
    Json(request): Json<VerifyRequest>,
) -> Response {
    debug!(code = %request.qr_code, "secondary verification request");
    respond(simulator.verify_secondary(&request.qr_code))
}
