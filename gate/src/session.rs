//! The gate session state machine.
//!
//! One mutable [`GateSession`] per gate lane, advanced exclusively by
//! [`GateSession::apply`]. The pause flag is the only mutual-exclusion
//! mechanism in the system: it is set synchronously the instant a code is
//! accepted for processing, so at most one verification call is ever in
//! flight. Backend responses that no longer match the in-flight record
//! (after a reset, or duplicated delivery) are discarded.

use crate::event::{Effect, Event, OperatorAction, Timer};
use crate::messages;
use aboor_types::{effective_code, Outcome, Phase, ScanStep, Ticket, VerificationResult};
use tracing::{debug, info, warn};

/// Number of cooldown ticks between first acceptance and the second scan.
/// Fixed: the window exists so the ticket app can regenerate its code.
pub const COOLDOWN_TICKS: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Waiting,
    Success,
    Error,
}

/// Status card shown to the operator: kind (for styling), icon, headline,
/// and a free-form details line.
#[derive(Clone, Debug, PartialEq)]
pub struct Status {
    pub kind: StatusKind,
    pub icon: &'static str,
    pub message: &'static str,
    pub details: String,
}

impl Status {
    fn waiting(icon: &'static str, message: &'static str, details: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Waiting,
            icon,
            message,
            details: details.into(),
        }
    }

    fn success(icon: &'static str, message: &'static str, details: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            icon,
            message,
            details: details.into(),
        }
    }

    fn error(icon: &'static str, message: &'static str, details: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            icon,
            message,
            details: details.into(),
        }
    }
}

/// All mutable state owned by one gate session.
#[derive(Clone, Debug, PartialEq)]
pub struct GateSession {
    step: ScanStep,
    /// The verification currently in flight, with the effective code it was
    /// issued for. `Some` is the "pending" sub-state.
    in_flight: Option<(Phase, String)>,
    /// Set once per session, on successful primary verification. Compared,
    /// never mutated, by the duplicate check.
    first_code: Option<String>,
    paused: bool,
    manual_input: bool,
    countdown: Option<u8>,
    ticket: Option<Ticket>,
    status: Option<Status>,
    instruction: &'static str,
    last_scan: Option<String>,
    last_result: Option<VerificationResult>,
}

impl Default for GateSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GateSession {
    pub fn new() -> Self {
        Self {
            step: ScanStep::AwaitingFirst,
            in_flight: None,
            first_code: None,
            paused: false,
            manual_input: false,
            countdown: None,
            ticket: None,
            status: None,
            instruction: messages::INSTRUCTION_FIRST,
            last_scan: None,
            last_result: None,
        }
    }

    pub fn step(&self) -> ScanStep {
        self.step
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn manual_input(&self) -> bool {
        self.manual_input
    }

    pub fn first_code(&self) -> Option<&str> {
        self.first_code.as_deref()
    }

    pub fn countdown(&self) -> Option<u8> {
        self.countdown
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn instruction(&self) -> &'static str {
        self.instruction
    }

    pub fn last_scan(&self) -> Option<&str> {
        self.last_scan.as_deref()
    }

    pub fn last_result(&self) -> Option<&VerificationResult> {
        self.last_result.as_ref()
    }

    /// Whether the operator should be offered the reset action: only once
    /// the session is resolved at the second-scan step.
    pub fn reset_available(&self) -> bool {
        self.step.is_resolved()
    }

    /// Apply one event, returning the effects the driver must execute.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::CodeScanned(raw) => self.on_scan(raw),
            Event::TimerTick(Timer::Cooldown) => self.on_cooldown_tick(),
            Event::TimerTick(Timer::Recovery) => self.on_recovery(),
            Event::VerifyOutcome(phase, result) => self.on_verify_outcome(phase, result),
            Event::Operator(OperatorAction::Reset) => self.on_reset(),
            Event::Operator(OperatorAction::ToggleInputMode) => self.on_toggle_input(),
        }
    }

    fn on_scan(&mut self, raw: String) -> Vec<Effect> {
        if self.paused || self.in_flight.is_some() {
            debug!("scan ignored: session paused or verification in flight");
            return vec![];
        }

        match self.step {
            ScanStep::AwaitingFirst => {
                let code = effective_code(&raw);
                debug!(%code, "first code scanned");
                self.last_scan = Some(raw);
                self.paused = true;
                self.in_flight = Some((Phase::Primary, code.clone()));
                self.status = Some(Status::waiting(
                    messages::ICON_WAITING,
                    messages::CHECKING_FIRST,
                    "",
                ));
                vec![Effect::PauseDecoder, Effect::Verify(Phase::Primary, code)]
            }
            ScanStep::AwaitingSecond => {
                let code = effective_code(&raw);
                self.last_scan = Some(raw);
                self.paused = true;
                if self.first_code.as_deref() == Some(code.as_str()) {
                    // Static image: the code did not regenerate. Never hits
                    // the backend, and never rearms on its own; the
                    // operator must look at this one.
                    warn!(%code, "duplicate code on second scan, flagging as fraud");
                    self.step = ScanStep::Resolved(Outcome::Fraud);
                    self.status = Some(Status::error(
                        messages::ICON_FRAUD,
                        messages::FRAUD_ALERT,
                        messages::FRAUD_DETAILS,
                    ));
                    vec![Effect::PauseDecoder]
                } else {
                    debug!(%code, "second code scanned");
                    self.in_flight = Some((Phase::Secondary, code.clone()));
                    self.status = Some(Status::waiting(
                        messages::ICON_WAITING,
                        messages::CHECKING_SECOND,
                        "",
                    ));
                    vec![Effect::PauseDecoder, Effect::Verify(Phase::Secondary, code)]
                }
            }
            ScanStep::CooldownAfterFirst | ScanStep::Resolved(_) => {
                debug!(step = ?self.step, "scan ignored in current step");
                vec![]
            }
        }
    }

    fn on_verify_outcome(&mut self, phase: Phase, result: VerificationResult) -> Vec<Effect> {
        let code = match self.in_flight.take() {
            Some((pending, code)) if pending == phase => code,
            other => {
                // Stale (post-reset) or duplicated response; the new session
                // simply ignores it.
                debug!(%phase, "discarding verify outcome with no matching in-flight call");
                self.in_flight = other;
                return vec![];
            }
        };

        self.last_result = Some(result.clone());
        match phase {
            Phase::Primary => self.on_primary_outcome(code, result),
            Phase::Secondary => self.on_secondary_outcome(result),
        }
    }

    fn on_primary_outcome(&mut self, code: String, result: VerificationResult) -> Vec<Effect> {
        match result {
            VerificationResult::Accepted { payload } => {
                info!(%code, "primary code verified");
                self.first_code = Some(code);
                self.ticket = Some(payload);
                self.step = ScanStep::CooldownAfterFirst;
                self.countdown = Some(COOLDOWN_TICKS);
                self.instruction = messages::INSTRUCTION_COOLDOWN;
                self.status = Some(Status::success(
                    messages::ICON_SUCCESS,
                    messages::FIRST_ACCEPTED,
                    messages::FIRST_ACCEPTED_DETAILS,
                ));
                vec![Effect::StartCooldown]
            }
            VerificationResult::Rejected { reason } => {
                info!(%reason, "primary code rejected");
                let details = if reason.is_empty() {
                    messages::INVALID_CODE.to_string()
                } else {
                    reason
                };
                self.status = Some(Status::error(
                    messages::ICON_ERROR,
                    messages::VERIFY_FAILED,
                    details,
                ));
                vec![Effect::ScheduleRecovery]
            }
            VerificationResult::TransportError { message } => {
                warn!(%message, "primary verification failed to reach backend");
                let details = if message.is_empty() {
                    messages::SERVER_HINT.to_string()
                } else {
                    message
                };
                self.status = Some(Status::error(
                    messages::ICON_ERROR,
                    messages::CONNECTION_ERROR,
                    details,
                ));
                vec![Effect::ScheduleRecovery]
            }
        }
    }

    fn on_secondary_outcome(&mut self, result: VerificationResult) -> Vec<Effect> {
        match result {
            VerificationResult::Accepted { payload } => {
                let name = payload.user.as_ref().map(|user| user.name.clone());
                info!(name = name.as_deref().unwrap_or(""), "entry granted");
                match self.ticket.take() {
                    Some(mut ticket) => {
                        ticket.merge(payload);
                        self.ticket = Some(ticket);
                    }
                    None => self.ticket = Some(payload),
                }
                self.step = ScanStep::Resolved(Outcome::Accepted);
                self.instruction = messages::INSTRUCTION_ADMITTED;
                self.status = Some(Status::success(
                    messages::ICON_CELEBRATE,
                    messages::ADMITTED,
                    messages::greeting(name.as_deref()),
                ));
                vec![]
            }
            VerificationResult::Rejected { reason } => {
                info!(%reason, "secondary code rejected");
                let details = if reason.is_empty() {
                    messages::INVALID_CODE.to_string()
                } else {
                    reason
                };
                self.step = ScanStep::Resolved(Outcome::Rejected);
                self.status = Some(Status::error(
                    messages::ICON_ERROR,
                    messages::VERIFY_FAILED,
                    details,
                ));
                vec![]
            }
            VerificationResult::TransportError { message } => {
                warn!(%message, "secondary verification failed to reach backend");
                let details = if message.is_empty() {
                    messages::SERVER_HINT.to_string()
                } else {
                    message
                };
                self.step = ScanStep::Resolved(Outcome::Rejected);
                self.status = Some(Status::error(
                    messages::ICON_ERROR,
                    messages::CONNECTION_ERROR,
                    details,
                ));
                vec![]
            }
        }
    }

    fn on_cooldown_tick(&mut self) -> Vec<Effect> {
        if self.step != ScanStep::CooldownAfterFirst {
            return vec![];
        }
        let Some(remaining) = self.countdown else {
            return vec![];
        };

        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.countdown = Some(remaining);
            return vec![];
        }

        debug!("cooldown finished, prompting for second scan");
        self.countdown = None;
        self.step = ScanStep::AwaitingSecond;
        self.paused = false;
        self.instruction = messages::INSTRUCTION_SECOND;
        self.status = Some(Status::waiting(
            messages::ICON_SCAN,
            messages::READY_FOR_SECOND,
            messages::READY_FOR_SECOND_DETAILS,
        ));
        vec![Effect::ResumeDecoder]
    }

    fn on_recovery(&mut self) -> Vec<Effect> {
        // A new verification may already be in flight (manual submissions
        // are not blocked by the physical decoder pause); leave it alone.
        if self.in_flight.is_some() {
            return vec![];
        }
        if self.step == ScanStep::AwaitingFirst && self.paused {
            debug!("recovery delay elapsed, unpausing");
            self.paused = false;
            return vec![Effect::ResumeDecoder];
        }
        vec![]
    }

    fn on_reset(&mut self) -> Vec<Effect> {
        info!("session reset");
        let manual_input = self.manual_input;
        *self = Self::new();
        self.manual_input = manual_input;
        vec![Effect::ResumeDecoder]
    }

    fn on_toggle_input(&mut self) -> Vec<Effect> {
        self.manual_input = !self.manual_input;
        debug!(manual_input = self.manual_input, "input mode toggled");
        if self.manual_input {
            vec![Effect::StopDecoder]
        } else {
            vec![Effect::StartDecoder]
        }
    }
}
