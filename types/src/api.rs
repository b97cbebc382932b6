//! Wire contract with the verification backend.
//!
//! Requests and responses are plain JSON. The response shape is validated
//! strictly on receipt: `success` is required, and anything the backend sends
//! that does not match is treated as a transport-level failure rather than
//! read optimistically.

use crate::ticket::Ticket;
use serde::{Deserialize, Serialize};

/// The two backend calls corresponding to the first and second ticket scans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Primary,
    Secondary,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Primary => write!(f, "primary"),
            Phase::Secondary => write!(f, "secondary"),
        }
    }
}

/// Body of both verification requests.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub qr_code: String,
}

/// Response envelope shared by both verification endpoints.
///
/// `message` and `error` are the backend's two (historically inconsistent)
/// failure-text fields; `message` wins when both are present.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Ticket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyResponse {
    /// The failure text to show the operator, if the backend supplied one.
    pub fn failure_reason(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}

/// Uniform outcome of one verification call.
#[derive(Clone, Debug, PartialEq)]
pub enum VerificationResult {
    /// Backend confirmed the code; `payload` is passed through for display.
    Accepted { payload: Ticket },
    /// Backend explicitly rejected the code.
    Rejected { reason: String },
    /// No usable response: network failure, timeout, or a body the contract
    /// does not recognize.
    TransportError { message: String },
}

impl VerificationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerificationResult::Accepted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_response_parses() {
        let resp: VerifyResponse = serde_json::from_str(
            r#"{"success":true,"data":{"ticketId":"T-ABC123","status":"valid"}}"#,
        )
        .expect("parse");
        assert!(resp.success);
        let data = resp.data.expect("data");
        assert_eq!(data.ticket_id.as_deref(), Some("T-ABC123"));
    }

    #[test]
    fn failure_response_parses_without_data() {
        let resp: VerifyResponse =
            serde_json::from_str(r#"{"success":false,"message":"Ticket already used"}"#)
                .expect("parse");
        assert!(!resp.success);
        assert_eq!(resp.failure_reason(), Some("Ticket already used"));
    }

    #[test]
    fn message_takes_precedence_over_error() {
        let resp: VerifyResponse =
            serde_json::from_str(r#"{"success":false,"message":"msg","error":"err"}"#)
                .expect("parse");
        assert_eq!(resp.failure_reason(), Some("msg"));

        let resp: VerifyResponse =
            serde_json::from_str(r#"{"success":false,"error":"err"}"#).expect("parse");
        assert_eq!(resp.failure_reason(), Some("err"));
    }

    #[test]
    fn missing_success_fails_to_parse() {
        // Fail closed: a body without the success flag is not a verification
        // response.
        assert!(serde_json::from_str::<VerifyResponse>(r#"{"data":{}}"#).is_err());
        assert!(serde_json::from_str::<VerifyResponse>(r#"{"ok":true}"#).is_err());
    }

    #[test]
    fn request_uses_backend_field_name() {
        let body = serde_json::to_string(&VerifyRequest {
            qr_code: "ABC123".into(),
        })
        .expect("serialize");
        assert_eq!(body, r#"{"qrCode":"ABC123"}"#);
    }
}
