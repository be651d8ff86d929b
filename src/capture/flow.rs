//! The screenshot-and-crop flow as an explicit state machine.
//!
//! Pure bookkeeping, no window or OS calls — the command layer performs the
//! side effects this module decides on. Two invariants live here:
//!
//! - the origin window is restored at most once per session (the normal
//!   path and the watchdog both go through the same latch), and
//! - exactly one selection (region or full frame) wins; later calls find
//!   the session closed.

use super::CaptureError;
use crate::editor::Rect;
use image::DynamicImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Capturing,
    AwaitingSelection,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Region(Rect),
    FullFrame,
}

/// Position and size of the captured display, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Side effects the caller must perform after replacing or cancelling a
/// session. Prevents orphaned overlay windows and permanently hidden
/// origin windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Teardown {
    pub close_overlay: bool,
    pub restore_origin: bool,
}

#[derive(Debug)]
pub struct CaptureFlow {
    phase: Phase,
    generation: u64,
    frame: Option<DynamicImage>,
    display: Option<DisplayBounds>,
    origin_restored: bool,
}

impl CaptureFlow {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
            frame: None,
            display: None,
            origin_restored: true, // nothing hidden yet
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn display(&self) -> Option<DisplayBounds> {
        self.display
    }

    /// Starts a new session, cancelling any active one first. The returned
    /// teardown must be executed before the new capture's side effects.
    /// The generation token identifies this attempt; a capture that finishes
    /// after another `begin` is rejected as superseded.
    pub fn begin(&mut self) -> (u64, Teardown) {
        let teardown = self.teardown();
        self.phase = Phase::Capturing;
        self.generation += 1;
        self.frame = None;
        self.display = None;
        self.origin_restored = false;
        (self.generation, teardown)
    }

    /// Raw display bytes arrived: Capturing -> AwaitingSelection.
    pub fn frame_ready(
        &mut self,
        generation: u64,
        frame: DynamicImage,
        display: DisplayBounds,
    ) -> Result<(), CaptureError> {
        if generation != self.generation {
            return Err(CaptureError::Superseded);
        }
        if self.phase != Phase::Capturing {
            return Err(CaptureError::SelectionClosed);
        }
        self.frame = Some(frame);
        self.display = Some(display);
        self.phase = Phase::AwaitingSelection;
        Ok(())
    }

    /// Capture failed: the session is over, visibility must be restored.
    pub fn fail(&mut self, generation: u64) {
        if generation == self.generation && self.phase == Phase::Capturing {
            self.phase = Phase::Cancelled;
        }
    }

    /// First-wins terminal selection. Consumes the frame; the second caller
    /// (and any call outside `AwaitingSelection`) gets `SelectionClosed`.
    /// Returns the winning session's generation so the caller's deferred
    /// side effects stay bound to it.
    pub fn select(
        &mut self,
        selection: Selection,
    ) -> Result<(DynamicImage, Selection, u64), CaptureError> {
        if self.phase != Phase::AwaitingSelection {
            return Err(CaptureError::SelectionClosed);
        }
        let frame = self.frame.take().ok_or(CaptureError::SelectionClosed)?;
        self.phase = Phase::Completed;
        Ok((frame, selection, self.generation))
    }

    /// User abandoned the overlay (escape key, window closed).
    pub fn cancel(&mut self) -> Teardown {
        let teardown = self.teardown();
        self.phase = Phase::Cancelled;
        self.frame = None;
        teardown
    }

    /// One-shot latch guarding the origin window restore, bound to one
    /// session. Returns true only the first time for the session that owns
    /// `generation`; a restore deferred from a replaced session (normal
    /// path or watchdog) finds the generation mismatched and does nothing,
    /// so the window is shown exactly once and never mid-capture of a
    /// newer session.
    pub fn take_origin_restore_for(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        self.take_origin_restore()
    }

    fn take_origin_restore(&mut self) -> bool {
        if self.origin_restored {
            false
        } else {
            self.origin_restored = true;
            true
        }
    }

    fn teardown(&self) -> Teardown {
        Teardown {
            close_overlay: self.phase == Phase::AwaitingSelection,
            restore_origin: !self.origin_restored,
        }
    }
}

impl Default for CaptureFlow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn frame() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(4, 4))
    }

    fn bounds() -> DisplayBounds {
        DisplayBounds { x: 0, y: 0, width: 4, height: 4 }
    }

    #[test]
    fn happy_path_reaches_completed() {
        let mut flow = CaptureFlow::new();
        let (gen, teardown) = flow.begin();
        assert_eq!(teardown, Teardown::default());
        assert_eq!(flow.phase(), Phase::Capturing);

        flow.frame_ready(gen, frame(), bounds()).unwrap();
        assert_eq!(flow.phase(), Phase::AwaitingSelection);

        let (_, selection, winner) = flow.select(Selection::FullFrame).unwrap();
        assert_eq!(selection, Selection::FullFrame);
        assert_eq!(winner, gen);
        assert_eq!(flow.phase(), Phase::Completed);
    }

    #[test]
    fn selection_is_first_wins() {
        let mut flow = CaptureFlow::new();
        let (gen, _) = flow.begin();
        flow.frame_ready(gen, frame(), bounds()).unwrap();

        let rect = Rect { x: 0, y: 0, w: 2, h: 2 };
        assert!(flow.select(Selection::Region(rect)).is_ok());
        assert!(matches!(
            flow.select(Selection::FullFrame),
            Err(CaptureError::SelectionClosed)
        ));
    }

    #[test]
    fn origin_restore_fires_exactly_once_per_session() {
        let mut flow = CaptureFlow::new();
        let (gen, _) = flow.begin();
        assert!(flow.take_origin_restore_for(gen));
        assert!(!flow.take_origin_restore_for(gen)); // watchdog finds it done

        let (next, _) = flow.begin();
        assert!(flow.take_origin_restore_for(next)); // fresh latch per session
    }

    #[test]
    fn begin_while_awaiting_selection_tears_down_the_overlay() {
        let mut flow = CaptureFlow::new();
        let (gen, _) = flow.begin();
        flow.frame_ready(gen, frame(), bounds()).unwrap();
        assert!(flow.take_origin_restore_for(gen)); // normal flow restored it

        let (_, teardown) = flow.begin();
        assert!(teardown.close_overlay);
        // Already shown once — replacing must not show it a second time.
        assert!(!teardown.restore_origin);
    }

    #[test]
    fn deferred_restore_from_a_replaced_session_spares_the_new_latch() {
        // Session A reaches AwaitingSelection, then B replaces it and hides
        // the window for its own capture. A's restore, arriving late, must
        // not show the window B just hid.
        let mut flow = CaptureFlow::new();
        let (gen_a, _) = flow.begin();
        flow.frame_ready(gen_a, frame(), bounds()).unwrap();
        let (gen_b, teardown) = flow.begin();
        assert!(teardown.restore_origin); // B's teardown settles A's debt

        assert!(!flow.take_origin_restore_for(gen_a));
        assert!(flow.take_origin_restore_for(gen_b)); // B's latch is intact
    }

    #[test]
    fn begin_while_capturing_requests_origin_restore() {
        let mut flow = CaptureFlow::new();
        flow.begin();
        let (_, teardown) = flow.begin();
        assert!(!teardown.close_overlay);
        assert!(teardown.restore_origin);
    }

    #[test]
    fn stale_watchdog_cannot_restore_the_newer_session() {
        let mut flow = CaptureFlow::new();
        let (old_gen, _) = flow.begin();
        let (new_gen, _) = flow.begin();

        assert!(!flow.take_origin_restore_for(old_gen));
        assert!(flow.take_origin_restore_for(new_gen));
    }

    #[test]
    fn stale_capture_result_is_superseded() {
        let mut flow = CaptureFlow::new();
        let (old_gen, _) = flow.begin();
        flow.begin();
        assert!(matches!(
            flow.frame_ready(old_gen, frame(), bounds()),
            Err(CaptureError::Superseded)
        ));
    }

    #[test]
    fn failed_capture_cancels_the_session() {
        let mut flow = CaptureFlow::new();
        let (gen, _) = flow.begin();
        flow.fail(gen);
        assert_eq!(flow.phase(), Phase::Cancelled);
        assert!(matches!(
            flow.select(Selection::FullFrame),
            Err(CaptureError::SelectionClosed)
        ));
        // Visibility is still owed to the user.
        assert!(flow.take_origin_restore_for(gen));
    }

    #[test]
    fn cancel_reports_pending_teardown() {
        let mut flow = CaptureFlow::new();
        let (gen, _) = flow.begin();
        flow.frame_ready(gen, frame(), bounds()).unwrap();
        let teardown = flow.cancel();
        assert!(teardown.close_overlay);
        assert!(teardown.restore_origin);
        assert_eq!(flow.phase(), Phase::Cancelled);
    }
}
