//! Events consumed and effects produced by the gate state machine.
//!
//! Every external input (a decode, a timer firing, a backend response, an
//! operator keypress) becomes one [`Event`], applied to the session one at
//! a time. The session never performs I/O itself; it answers with
//! [`Effect`]s for the driver to execute.

use aboor_types::{Phase, VerificationResult};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Raw text from the decoder or the manual input path.
    CodeScanned(String),
    TimerTick(Timer),
    /// Outcome of a verification call issued by an earlier `Verify` effect.
    VerifyOutcome(Phase, VerificationResult),
    Operator(OperatorAction),
}

/// The two timers the session runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    /// One of the fixed ticks between first acceptance and the second scan.
    Cooldown,
    /// The single delayed unpause after a failed first verification.
    Recovery,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorAction {
    Reset,
    ToggleInputMode,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Call the backend with the effective code.
    Verify(Phase, String),
    /// Deliver exactly [`crate::COOLDOWN_TICKS`] `Cooldown` ticks, one tick
    /// interval apart.
    StartCooldown,
    /// Deliver one `Recovery` tick after the recovery delay.
    ScheduleRecovery,
    PauseDecoder,
    ResumeDecoder,
    StartDecoder,
    StopDecoder,
}
