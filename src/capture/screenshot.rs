//! Display enumeration and capture using the `xcap` crate.
//!
//! This is the infrastructure layer — it talks to the OS. Everything here
//! is consumed by the command layer; the state machine in `flow.rs` never
//! touches it.

use super::{CaptureError, DisplayBounds};
use image::DynamicImage;
use xcap::Monitor;

/// Picks the display nearest to the given point — the user's capture intent
/// follows the window they were just looking at, not the primary display.
/// A display containing the point wins outright; otherwise the one with the
/// closest center.
pub fn nearest_monitor(x: i32, y: i32) -> Result<Monitor, CaptureError> {
    let monitors =
        Monitor::all().map_err(|e| CaptureError::MonitorEnumeration(e.to_string()))?;

    let mut best: Option<(i64, Monitor)> = None;
    for monitor in monitors {
        let bounds = monitor_bounds(&monitor);
        if contains(bounds, x, y) {
            return Ok(monitor);
        }
        let cx = i64::from(bounds.x) + i64::from(bounds.width) / 2;
        let cy = i64::from(bounds.y) + i64::from(bounds.height) / 2;
        let dist = (cx - i64::from(x)).pow(2) + (cy - i64::from(y)).pow(2);
        if best.as_ref().map_or(true, |(d, _)| dist < *d) {
            best = Some((dist, monitor));
        }
    }

    best.map(|(_, m)| m).ok_or(CaptureError::NoDisplay)
}

/// Captures the full frame of one display.
pub fn capture_monitor(monitor: &Monitor) -> Result<DynamicImage, CaptureError> {
    monitor
        .capture_image()
        .map(DynamicImage::ImageRgba8)
        .map_err(|e| CaptureError::CaptureFailed(e.to_string()))
}

pub fn monitor_bounds(monitor: &Monitor) -> DisplayBounds {
    DisplayBounds {
        x: monitor.x().unwrap_or(0),
        y: monitor.y().unwrap_or(0),
        width: monitor.width().unwrap_or(0),
        height: monitor.height().unwrap_or(0),
    }
}

fn contains(bounds: DisplayBounds, x: i32, y: i32) -> bool {
    x >= bounds.x
        && y >= bounds.y
        && i64::from(x) < i64::from(bounds.x) + i64::from(bounds.width)
        && i64::from(y) < i64::from(bounds.y) + i64::from(bounds.height)
}
