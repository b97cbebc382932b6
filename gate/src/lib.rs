//! Gate-side logic for the two-scan ticket flow.
//!
//! A session walks an operator through: scan the ticket's first QR code,
//! verify it with the backend, wait a fixed cooldown for the ticket app to
//! regenerate its code, then scan again. A second code identical to the
//! first means the holder is showing a static image (screenshot) and is
//! rejected on the spot without a backend call.

pub mod decoder;
pub mod driver;
pub mod event;
pub mod messages;
pub mod session;

pub use decoder::{CameraId, DecodeCallback, Decoder, DecoderConfig, DecoderError, ScanGuard};
pub use driver::{Gate, GateTimings};
pub use event::{Effect, Event, OperatorAction, Timer};
pub use session::{GateSession, Status, StatusKind, COOLDOWN_TICKS};
