//! Screen capture domain — public API.
//!
//! `flow` is the pure state machine for the screenshot-and-crop session;
//! `screenshot` is the xcap infrastructure it is fed from. External code
//! should only use what is re-exported here.

mod flow;
mod screenshot;

pub use flow::{CaptureFlow, DisplayBounds, Phase, Selection, Teardown};
pub use screenshot::{capture_monitor, monitor_bounds, nearest_monitor};

use std::sync::Mutex;
use std::time::Duration;

/// How long the origin window may stay hidden before the watchdog
/// force-restores it. The capture itself is not aborted — only visibility
/// is guaranteed.
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to enumerate displays: {0}")]
    MonitorEnumeration(String),

    #[error("no display available")]
    NoDisplay,

    #[error("screen capture failed: {0}")]
    CaptureFailed(String),

    #[error("capture session is no longer accepting a selection")]
    SelectionClosed,

    #[error("capture attempt was superseded by a newer one")]
    Superseded,
}

/// Thread-safe storage for the capture session. At most one session is
/// active at a time; starting a new one replaces the old (see
/// `CaptureFlow::begin`).
pub struct CaptureState {
    pub flow: Mutex<CaptureFlow>,
}

impl CaptureState {
    pub fn new() -> Self {
        Self {
            flow: Mutex::new(CaptureFlow::new()),
        }
    }
}

impl Default for CaptureState {
    fn default() -> Self {
        Self::new()
    }
}
