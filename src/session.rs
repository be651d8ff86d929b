//! Top-level controller for the currently loaded image.
//!
//! The session is the only owner of the current-image slot. It wires intake,
//! the edit engine and the undo stack together; the command layer wraps it
//! in a mutex, performs the webview notifications and serializes edits.

use crate::editor::{self, EditError, EditOp, PaletteColor};
use crate::history::HistoryStore;
use crate::intake::{self, IntakeError, Source};
use crate::picture::Picture;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no image loaded")]
    NoImageLoaded,

    #[error("another edit is still in progress")]
    EditInProgress,

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

pub struct Session {
    current: Option<Picture>,
    history: HistoryStore,
    palette: Option<Vec<PaletteColor>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            current: None,
            history: HistoryStore::new(),
            palette: None,
        }
    }

    pub fn current(&self) -> Option<&Picture> {
        self.current.as_ref()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Loads a genuinely new image. Undo history is scoped to the edit
    /// chain of one image, so it is flushed here — unlike an edit, which
    /// pushes onto it. On failure nothing changes.
    pub fn load_new(&mut self, source: Source) -> Result<Picture, SessionError> {
        let picture = intake::normalize(source)?;
        self.history.flush();
        self.palette = None;
        self.current = Some(picture.clone());
        log::info!(
            "[SESSION] Loaded new image ({} bytes, {})",
            picture.bytes().len(),
            picture.mime()
        );
        Ok(picture)
    }

    /// Applies one edit. The pre-edit state is pushed *before* the edit so
    /// undo restores it; if the edit fails the push is rolled back and the
    /// slot is untouched.
    pub fn request_edit(&mut self, op: &EditOp) -> Result<Picture, SessionError> {
        let current = self.current.clone().ok_or(SessionError::NoImageLoaded)?;
        self.history.push(current.clone());

        match editor::apply(&current, op) {
            Ok(edited) => {
                self.current = Some(edited.clone());
                self.palette = None;
                log::info!("[SESSION] Applied {:?}, history depth {}", op, self.history.len());
                Ok(edited)
            }
            Err(err) => {
                self.history.pop();
                Err(err.into())
            }
        }
    }

    /// Restores the most recent prior state. `None` means nothing to undo;
    /// the current image is left alone. Single-level-per-pop — the replaced
    /// image is discarded, there is no redo.
    pub fn undo(&mut self) -> Option<Picture> {
        let previous = self.history.pop()?;
        self.palette = None;
        self.current = Some(previous.clone());
        Some(previous)
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.palette = None;
        self.history.flush();
    }

    /// Dominant colors of the current image, computed once per image and
    /// cached until the slot changes.
    pub fn palette(&mut self) -> Result<Vec<PaletteColor>, SessionError> {
        let current = self.current.as_ref().ok_or(SessionError::NoImageLoaded)?;
        if let Some(cached) = &self.palette {
            return Ok(cached.clone());
        }
        let decoded = current.decode().map_err(EditError::from)?;
        let palette = editor::extract_palette(&decoded);
        self.palette = Some(palette.clone());
        Ok(palette)
    }

    #[cfg(test)]
    pub(crate) fn seed_palette_cache(&mut self, palette: Vec<PaletteColor>) {
        self.palette = Some(palette);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
