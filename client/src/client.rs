use crate::{Error, Result};
use aboor_types::{Phase, VerificationResult, VerifyRequest, VerifyResponse};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Request timeout applied to every verification call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Endpoint paths for the two verification calls.
///
/// The backend exposes two generations of routes: the current per-step pair
/// and the legacy pair it superseded. Both accept the same body and return
/// the same envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApiRoutes {
    primary: &'static str,
    secondary: &'static str,
    primary_fallback: &'static str,
    secondary_fallback: &'static str,
}

impl ApiRoutes {
    pub const CURRENT: Self = Self {
        primary: "/api/tickets/verify-qr1",
        secondary: "/api/tickets/verify-qr2",
        primary_fallback: "Failed to verify QR Code 1",
        secondary_fallback: "Failed to verify QR Code 2",
    };

    pub const LEGACY: Self = Self {
        primary: "/api/tickets/switch-qr",
        secondary: "/api/tickets/verify-secondary-qr",
        primary_fallback: "Failed to verify QR code",
        secondary_fallback: "Failed to verify secondary QR code",
    };

    fn path(&self, phase: Phase) -> &'static str {
        match phase {
            Phase::Primary => self.primary,
            Phase::Secondary => self.secondary,
        }
    }

    /// Rejection text used when the backend sends a failure without one.
    fn fallback_reason(&self, phase: Phase) -> &'static str {
        match phase {
            Phase::Primary => self.primary_fallback,
            Phase::Secondary => self.secondary_fallback,
        }
    }
}

/// Client for the ticket verification API.
///
/// Stateless per call: no retries, no caching. Callers are expected to keep
/// at most one verification in flight per session.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    pub base_url: Url,
    routes: ApiRoutes,
    timeout: Duration,
}

impl Client {
    /// Create a client for the given backend base URL.
    ///
    /// Only `http` and `https` URLs are accepted.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => return Err(Error::InvalidScheme(scheme.to_string())),
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            routes: ApiRoutes::CURRENT,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Select which generation of endpoint paths to call.
    pub fn with_api(mut self, routes: ApiRoutes) -> Self {
        self.routes = routes;
        self
    }

    /// Override the request timeout. Tests shrink this; production keeps
    /// [`DEFAULT_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Verify the first scanned code.
    pub async fn verify_primary(&self, code: &str) -> VerificationResult {
        self.verify(Phase::Primary, code).await
    }

    /// Verify the second scanned code.
    pub async fn verify_secondary(&self, code: &str) -> VerificationResult {
        self.verify(Phase::Secondary, code).await
    }

    /// Issue one verification call and normalize every outcome (structured
    /// success, structured failure, or transport failure) into a
    /// [`VerificationResult`].
    pub async fn verify(&self, phase: Phase, code: &str) -> VerificationResult {
        match self.try_verify(phase, code).await {
            Ok(result) => result,
            Err(err) => {
                warn!(%phase, error = %err, "verification transport failure");
                VerificationResult::TransportError {
                    message: err.to_string(),
                }
            }
        }
    }

    async fn try_verify(&self, phase: Phase, code: &str) -> Result<VerificationResult> {
        let url = self.base_url.join(self.routes.path(phase))?;
        debug!(%phase, %url, "verifying code");
        let response = self
            .http
            .post(url)
            .timeout(self.timeout)
            .json(&VerifyRequest {
                qr_code: code.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        match serde_json::from_slice::<VerifyResponse>(&body) {
            Ok(envelope) if envelope.success => match envelope.data {
                Some(payload) => {
                    debug!(%phase, "code accepted");
                    Ok(VerificationResult::Accepted { payload })
                }
                // success without a payload is not a shape we trust
                None => Err(Error::UnexpectedResponse),
            },
            Ok(envelope) => {
                let reason = envelope
                    .failure_reason()
                    .unwrap_or(self.routes.fallback_reason(phase))
                    .to_string();
                debug!(%phase, %reason, "code rejected");
                Ok(VerificationResult::Rejected { reason })
            }
            Err(_) if !status.is_success() => Err(Error::Failed(status)),
            Err(err) => Err(Error::UnexpectedBody(err)),
        }
    }
}
