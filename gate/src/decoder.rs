//! Camera decoder boundary.
//!
//! The actual camera/QR pipeline is an external capability; this module
//! defines the seam the gate consumes it through, plus the scoped guard
//! that guarantees the camera is released on every exit path. Decode
//! failures on individual frames are routine and never surfaced; adapter
//! errors (no camera, permission denied) are non-fatal diagnostics, and
//! scanning simply does not start.

use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("no camera available")]
    NoCamera,
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("decoder initialization failed: {0}")]
    Init(String),
    #[error("decoder stop failed: {0}")]
    Stop(String),
}

/// Opaque identifier of a capture device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraId(pub String);

/// Capture configuration handed to the adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecoderConfig {
    /// Decode attempts per second.
    pub fps: u32,
    /// Scan box edge as a fraction of the shorter viewfinder dimension.
    pub scan_box_ratio: f64,
    pub aspect_ratio: f64,
    /// Also try mirrored frames.
    pub scan_flipped: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            fps: 20,
            scan_box_ratio: 0.8,
            aspect_ratio: 1.0,
            scan_flipped: true,
        }
    }
}

impl DecoderConfig {
    /// Square scan box for the given viewfinder: 80% of the shorter edge.
    pub fn scan_box(&self, viewfinder_width: u32, viewfinder_height: u32) -> (u32, u32) {
        let min_edge = viewfinder_width.min(viewfinder_height);
        let size = (min_edge as f64 * self.scan_box_ratio).floor() as u32;
        (size, size)
    }
}

pub type DecodeCallback = Box<dyn FnMut(String) + Send>;
pub type DecodeErrorCallback = Box<dyn FnMut(String) + Send>;

/// Consumed camera/QR capability.
///
/// `on_decode` receives decoded text; `on_decode_error` receives per-frame
/// decode failures (routinely ignored by callers).
pub trait Decoder {
    fn list_cameras(&mut self) -> Result<Vec<CameraId>, DecoderError>;
    fn start(
        &mut self,
        camera: &CameraId,
        config: DecoderConfig,
        on_decode: DecodeCallback,
        on_decode_error: DecodeErrorCallback,
    ) -> Result<(), DecoderError>;
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self) -> Result<(), DecoderError>;
    fn is_scanning(&self) -> bool;
}

/// Scoped camera acquisition: picks a camera, starts the decoder, and stops
/// it when dropped, whichever way control leaves the scanning scope.
pub struct ScanGuard<D: Decoder> {
    // Taken by `stop`; Drop stops whatever is still held.
    decoder: Option<D>,
}

impl<D: Decoder> ScanGuard<D> {
    /// Start scanning on the last listed camera (on phones this is the
    /// rear-facing one).
    pub fn start(
        mut decoder: D,
        config: DecoderConfig,
        on_decode: DecodeCallback,
        on_decode_error: DecodeErrorCallback,
    ) -> Result<Self, DecoderError> {
        let cameras = decoder.list_cameras()?;
        let camera = cameras.last().cloned().ok_or(DecoderError::NoCamera)?;
        decoder.start(&camera, config, on_decode, on_decode_error)?;
        Ok(Self {
            decoder: Some(decoder),
        })
    }

    pub fn pause(&mut self) {
        if let Some(decoder) = &mut self.decoder {
            decoder.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(decoder) = &mut self.decoder {
            decoder.resume();
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.decoder
            .as_ref()
            .is_some_and(|decoder| decoder.is_scanning())
    }

    /// Stop explicitly, recovering the decoder for a later restart.
    pub fn stop(mut self) -> Result<D, DecoderError> {
        let mut decoder = match self.decoder.take() {
            Some(decoder) => decoder,
            None => return Err(DecoderError::Stop("decoder already taken".to_string())),
        };
        if decoder.is_scanning() {
            decoder.stop()?;
        }
        Ok(decoder)
    }
}

impl<D: Decoder> Drop for ScanGuard<D> {
    fn drop(&mut self) {
        if let Some(decoder) = &mut self.decoder {
            if decoder.is_scanning() {
                if let Err(err) = decoder.stop() {
                    warn!(error = %err, "failed to stop decoder on scope exit");
                }
            }
        }
    }
}
