pub mod api;
pub use api::{Phase, VerificationResult, VerifyRequest, VerifyResponse};
pub mod code;
pub use code::{detect_kind, effective_code, CodeKind};
pub mod ticket;
pub use ticket::{MatchInfo, Seat, Ticket, User};

/// Where the gate session currently is in the two-scan flow.
///
/// The session starts at [`ScanStep::AwaitingFirst`] and only the gate state
/// machine advances it; an operator reset returns it to the start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanStep {
    AwaitingFirst,
    CooldownAfterFirst,
    AwaitingSecond,
    Resolved(Outcome),
}

/// Terminal outcome of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected,
    /// The second scan matched the first code exactly: a static image
    /// (screenshot) rather than a live, regenerating ticket code.
    Fraud,
}

impl ScanStep {
    /// Position on the three-step operator indicator (scan 1 / wait / scan 2).
    pub fn indicator(&self) -> u8 {
        match self {
            ScanStep::AwaitingFirst => 1,
            ScanStep::CooldownAfterFirst => 2,
            ScanStep::AwaitingSecond | ScanStep::Resolved(_) => 3,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ScanStep::Resolved(_))
    }
}
