//! Tauri command handlers.
//!
//! Thin bridges between frontend invoke() calls and the domain modules.
//! Pattern for every handler: run the domain operation, emit the
//! notification the frontend renders (`image-loaded` on success, a short
//! `action` notice on failure), and map domain errors to strings at the
//! boundary. No raw panic ever crosses into the webview.

use crate::capture::{self, CaptureState, Selection};
use crate::editor::{self, EditOp, PaletteColor, Rect};
use crate::intake::Source;
use crate::picture::Picture;
use crate::session::{Session, SessionError};
use crate::settings::{Settings, SettingsStore};
use std::path::PathBuf;
use std::sync::Mutex;
use tauri::{Emitter, Manager};

pub const MAIN_WINDOW: &str = "main";
pub const OVERLAY_WINDOW: &str = "overlay";

/// Managed session state. The edit permit serializes edits: a second edit
/// issued while one is in flight is rejected instead of racing on the
/// current-image slot.
pub struct SessionState {
    pub session: Mutex<Session>,
    pub edit_permit: tokio::sync::Mutex<()>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(Session::new()),
            edit_permit: tokio::sync::Mutex::new(()),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frontend notifications ───────────────────────────────────────────

/// Transient notice shown by the frontend.
fn notify(app: &tauri::AppHandle, message: &str) {
    if let Err(e) = app.emit("action", message) {
        log::warn!("[SESSION] Failed to emit notice: {e}");
    }
}

fn emit_loaded(app: &tauri::AppHandle, picture: &Picture) {
    let payload = serde_json::json!({
        "image": picture.data_uri(),
        "mime": picture.mime(),
    });
    if let Err(e) = app.emit("image-loaded", payload) {
        log::warn!("[SESSION] Failed to emit image-loaded: {e}");
    }
}

// ── Loading ──────────────────────────────────────────────────────────

#[tauri::command]
pub fn load_file(
    app: tauri::AppHandle,
    state: tauri::State<'_, SessionState>,
    store: tauri::State<'_, SettingsStore>,
    path: String,
) -> Result<(), String> {
    let path = PathBuf::from(path);
    let result = {
        let mut session = state.session.lock().map_err(|e| e.to_string())?;
        session.load_new(Source::Path(path.clone()))
    };
    match result {
        Ok(picture) => {
            if let Err(e) = store.push_recent(&path) {
                log::warn!("[SESSION] Failed to update recents: {e}");
            }
            emit_loaded(&app, &picture);
            Ok(())
        }
        Err(err) => {
            notify(&app, "Failed to open image");
            Err(err.to_string())
        }
    }
}

/// Data URI from a drag-drop or the frontend's own clipboard handling.
#[tauri::command]
pub fn load_data(
    app: tauri::AppHandle,
    state: tauri::State<'_, SessionState>,
    data: String,
) -> Result<(), String> {
    let result = {
        let mut session = state.session.lock().map_err(|e| e.to_string())?;
        session.load_new(Source::DataUri(data))
    };
    match result {
        Ok(picture) => {
            emit_loaded(&app, &picture);
            Ok(())
        }
        Err(err) => {
            notify(&app, "Failed to load image");
            Err(err.to_string())
        }
    }
}

/// Reads an image off the system clipboard via arboard and loads it.
#[tauri::command]
pub fn paste_image(
    app: tauri::AppHandle,
    state: tauri::State<'_, SessionState>,
) -> Result<(), String> {
    let read = || -> Result<Picture, String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
        let data = clipboard.get_image().map_err(|e| e.to_string())?;
        let buffer = image::RgbaImage::from_raw(
            data.width as u32,
            data.height as u32,
            data.bytes.into_owned(),
        )
        .ok_or("clipboard image has inconsistent dimensions")?;
        Picture::from_dynamic(&image::DynamicImage::ImageRgba8(buffer))
            .map_err(|e| e.to_string())
    };

    let picture = match read() {
        Ok(p) => p,
        Err(err) => {
            notify(&app, "No image on the clipboard");
            return Err(err);
        }
    };

    let result = {
        let mut session = state.session.lock().map_err(|e| e.to_string())?;
        session.load_new(Source::Bytes(picture.bytes().to_vec()))
    };
    match result {
        Ok(loaded) => {
            emit_loaded(&app, &loaded);
            Ok(())
        }
        Err(err) => {
            notify(&app, "Failed to load image");
            Err(err.to_string())
        }
    }
}

// ── Capture flow ─────────────────────────────────────────────────────

/// Executes the teardown a replaced or cancelled capture session owes:
/// close its overlay, restore the origin window it hid.
fn run_teardown(app: &tauri::AppHandle, teardown: capture::Teardown) {
    if teardown.close_overlay {
        if let Some(overlay) = app.get_webview_window(OVERLAY_WINDOW) {
            let _ = overlay.destroy();
        }
    }
    if teardown.restore_origin {
        if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
            let _ = window.show();
        }
    }
}

/// Shows the origin window if the session owning `generation` has not shown
/// it yet. Both the normal flow and the watchdog call this; the latch in
/// `CaptureFlow` makes the show happen exactly once, and the generation
/// check keeps a restore deferred from a replaced session away from the
/// window a newer capture just hid.
fn restore_origin(app: &tauri::AppHandle, generation: u64) {
    let state = app.state::<CaptureState>();
    let should_show = state
        .flow
        .lock()
        .map(|mut flow| flow.take_origin_restore_for(generation))
        .unwrap_or(false);
    if should_show {
        if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
            if let Err(e) = window.show() {
                log::warn!("[CAPTURE] Failed to restore origin window: {e}");
            }
            let _ = window.set_focus();
        }
    }
}

/// Starts the screenshot flow: hide the origin window, capture the display
/// nearest to it, then open a fullscreen overlay on that display for the
/// crop selection. Replaces any capture session already in progress.
#[tauri::command]
pub async fn start_capture(
    app: tauri::AppHandle,
    window: tauri::WebviewWindow,
) -> Result<(), String> {
    let start = std::time::Instant::now();
    let state = app.state::<CaptureState>();

    let (generation, teardown) = {
        let mut flow = state.flow.lock().map_err(|e| e.to_string())?;
        flow.begin()
    };
    run_teardown(&app, teardown);

    let position = window.outer_position().map_err(|e| e.to_string())?;
    let monitor = match capture::nearest_monitor(position.x, position.y) {
        Ok(m) => m,
        Err(err) => {
            let mut flow = state.flow.lock().map_err(|e| e.to_string())?;
            flow.fail(generation);
            notify(&app, "Failed to take a screenshot");
            return Err(err.to_string());
        }
    };
    let bounds = capture::monitor_bounds(&monitor);

    // Hide before capturing so the viewer does not photograph itself.
    window.hide().map_err(|e| e.to_string())?;

    // Watchdog: whatever happens to the capture, the user gets their
    // window back. The generation check keeps a stale timer from touching
    // a session that replaced this one.
    let watchdog = app.clone();
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(capture::WATCHDOG_TIMEOUT).await;
        let state = watchdog.state::<CaptureState>();
        let should_show = state
            .flow
            .lock()
            .map(|mut flow| flow.take_origin_restore_for(generation))
            .unwrap_or(false);
        if should_show {
            log::warn!("[CAPTURE] Watchdog restoring the origin window");
            if let Some(window) = watchdog.get_webview_window(MAIN_WINDOW) {
                let _ = window.show();
            }
        }
    });

    let frame = match capture::capture_monitor(&monitor) {
        Ok(frame) => frame,
        Err(err) => {
            {
                let mut flow = state.flow.lock().map_err(|e| e.to_string())?;
                flow.fail(generation);
            }
            restore_origin(&app, generation);
            notify(&app, "Failed to take a screenshot");
            return Err(err.to_string());
        }
    };
    log::info!(
        "[CAPTURE] Captured {}x{} display in {}ms",
        bounds.width,
        bounds.height,
        start.elapsed().as_millis()
    );

    // Raw BMP temp file for the overlay, loaded via the asset protocol.
    // PNG-encoding a full Retina frame here would dominate the latency.
    let temp_path = std::env::temp_dir().join("refviewer-capture.bmp");
    if let Err(err) = frame.save(&temp_path) {
        {
            let mut flow = state.flow.lock().map_err(|e| e.to_string())?;
            flow.fail(generation);
        }
        restore_origin(&app, generation);
        notify(&app, "Failed to take a screenshot");
        return Err(err.to_string());
    }

    {
        let mut flow = state.flow.lock().map_err(|e| e.to_string())?;
        flow.frame_ready(generation, frame, bounds)
            .map_err(|e| e.to_string())?;
    }
    restore_origin(&app, generation);

    let overlay = tauri::WebviewWindowBuilder::new(
        &app,
        OVERLAY_WINDOW,
        tauri::WebviewUrl::App("screen.html".into()),
    )
    .title("RefViewer Capture")
    .position(f64::from(bounds.x), f64::from(bounds.y))
    .inner_size(f64::from(bounds.width), f64::from(bounds.height))
    .fullscreen(true)
    .decorations(false)
    .always_on_top(true)
    .skip_taskbar(true)
    .build()
    .map_err(|e| e.to_string())?;

    overlay
        .emit(
            "capture-ready",
            serde_json::json!({ "imagePath": temp_path.to_string_lossy() }),
        )
        .map_err(|e| e.to_string())?;

    log::info!(
        "[CAPTURE] Overlay up, awaiting selection ({}ms total)",
        start.elapsed().as_millis()
    );
    Ok(())
}

/// Overlay reports a crop rectangle. First selection wins.
#[tauri::command]
pub async fn select_region(
    app: tauri::AppHandle,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
) -> Result<(), String> {
    finish_selection(app, Selection::Region(Rect { x, y, w, h })).await
}

/// Overlay requests the whole captured frame.
#[tauri::command]
pub async fn select_full_frame(app: tauri::AppHandle) -> Result<(), String> {
    finish_selection(app, Selection::FullFrame).await
}

/// Overlay abandoned (escape key). Tears the session down and restores
/// the origin window.
#[tauri::command]
pub fn cancel_capture(app: tauri::AppHandle) -> Result<(), String> {
    let state = app.state::<CaptureState>();
    let teardown = {
        let mut flow = state.flow.lock().map_err(|e| e.to_string())?;
        flow.cancel()
    };
    run_teardown(&app, teardown);
    Ok(())
}

async fn finish_selection(app: tauri::AppHandle, selection: Selection) -> Result<(), String> {
    let state = app.state::<CaptureState>();
    let taken = {
        let mut flow = state.flow.lock().map_err(|e| e.to_string())?;
        flow.select(selection)
    };

    // The overlay comes down immediately on any terminal selection,
    // including a late second call that lost the race.
    if let Some(overlay) = app.get_webview_window(OVERLAY_WINDOW) {
        let _ = overlay.destroy();
    }

    let (frame, selection, generation) = taken.map_err(|e| e.to_string())?;

    let result = match selection {
        Selection::Region(rect) => editor::crop(&frame, rect),
        Selection::FullFrame => Ok(frame),
    };
    let image = match result {
        Ok(image) => image,
        Err(err) => {
            restore_origin(&app, generation);
            notify(&app, "Failed to crop the screenshot");
            return Err(err.to_string());
        }
    };

    let picture = Picture::from_dynamic(&image).map_err(|e| e.to_string())?;
    let loaded = {
        let session_state = app.state::<SessionState>();
        let mut session = session_state.session.lock().map_err(|e| e.to_string())?;
        session.load_new(Source::Bytes(picture.bytes().to_vec()))
    }
    .map_err(|e| e.to_string())?;

    emit_loaded(&app, &loaded);
    restore_origin(&app, generation);

    autosave_if_configured(&app, loaded);
    Ok(())
}

/// Post-capture autosave: fire-and-forget so delivery to the frontend is
/// never blocked on disk I/O.
fn autosave_if_configured(app: &tauri::AppHandle, picture: Picture) {
    let settings = app.state::<SettingsStore>().load();
    if !settings.autosave {
        return;
    }
    let Some(dir) = settings.savedir else {
        return;
    };

    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let filename = chrono::Local::now()
            .format("screenshot-%Y%m%d-%H%M%S.png")
            .to_string();
        let path = dir.join(filename);
        match editor::convert_and_save(&picture, &path) {
            Ok(()) => {
                log::info!("[CAPTURE] Autosaved screenshot to {}", path.display());
                notify(&app, "Screenshot saved");
            }
            Err(err) => {
                log::warn!("[CAPTURE] Autosave failed: {err}");
                notify(&app, "Failed to autosave screenshot");
            }
        }
    });
}

// ── Editing ──────────────────────────────────────────────────────────

#[tauri::command]
pub async fn edit_image(
    app: tauri::AppHandle,
    state: tauri::State<'_, SessionState>,
    request: EditOp,
) -> Result<(), String> {
    let _permit = state
        .edit_permit
        .try_lock()
        .map_err(|_| SessionError::EditInProgress.to_string())?;

    let result = {
        let mut session = state.session.lock().map_err(|e| e.to_string())?;
        session.request_edit(&request)
    };
    match result {
        Ok(picture) => {
            emit_loaded(&app, &picture);
            Ok(())
        }
        Err(err) => {
            notify(&app, "Failed to edit image");
            Err(err.to_string())
        }
    }
}

#[tauri::command]
pub fn undo_edit(
    app: tauri::AppHandle,
    state: tauri::State<'_, SessionState>,
) -> Result<(), String> {
    let popped = {
        let mut session = state.session.lock().map_err(|e| e.to_string())?;
        session.undo()
    };
    match popped {
        Some(picture) => emit_loaded(&app, &picture),
        None => notify(&app, "Nothing to undo"),
    }
    Ok(())
}

#[tauri::command]
pub fn clear_image(
    app: tauri::AppHandle,
    state: tauri::State<'_, SessionState>,
) -> Result<(), String> {
    {
        let mut session = state.session.lock().map_err(|e| e.to_string())?;
        session.clear();
    }
    if let Err(e) = app.emit("cleared", ()) {
        log::warn!("[SESSION] Failed to emit cleared: {e}");
    }
    Ok(())
}

#[tauri::command]
pub fn get_palette(
    state: tauri::State<'_, SessionState>,
) -> Result<Vec<PaletteColor>, String> {
    let mut session = state.session.lock().map_err(|e| e.to_string())?;
    session.palette().map_err(|e| e.to_string())
}

/// Saves the current image, converting to the format implied by the
/// destination extension. Without an explicit path the native save dialog
/// supplies one; cancelling the dialog is not an error.
#[tauri::command]
pub async fn save_image(
    app: tauri::AppHandle,
    state: tauri::State<'_, SessionState>,
    path: Option<String>,
) -> Result<(), String> {
    let picture = {
        let session = state.session.lock().map_err(|e| e.to_string())?;
        session.current().cloned()
    }
    .ok_or_else(|| SessionError::NoImageLoaded.to_string())?;

    let destination = match path {
        Some(p) => PathBuf::from(p),
        None => match ask_save_path(&app).await? {
            Some(p) => p,
            None => return Ok(()), // dialog cancelled
        },
    };

    match editor::convert_and_save(&picture, &destination) {
        Ok(()) => {
            notify(&app, "Image saved!");
            Ok(())
        }
        Err(err) => {
            notify(&app, "Failed to save image");
            Err(err.to_string())
        }
    }
}

/// One awaited call per dialog: the plugin's callback is bridged through a
/// oneshot channel instead of listener bookkeeping.
async fn ask_save_path(app: &tauri::AppHandle) -> Result<Option<PathBuf>, String> {
    use tauri_plugin_dialog::DialogExt;

    let (tx, rx) = tokio::sync::oneshot::channel();
    app.dialog()
        .file()
        .set_title("Save image")
        .set_file_name("image.png")
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff"])
        .save_file(move |file_path| {
            let _ = tx.send(file_path);
        });

    match rx.await.map_err(|e| e.to_string())? {
        Some(file_path) => file_path.into_path().map(Some).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

// ── Settings and recents ─────────────────────────────────────────────

#[tauri::command]
pub fn get_settings(store: tauri::State<'_, SettingsStore>) -> Settings {
    store.load()
}

#[tauri::command]
pub fn write_settings(
    app: tauri::AppHandle,
    store: tauri::State<'_, SettingsStore>,
    settings: Settings,
) -> Result<(), String> {
    store.write(&settings).map_err(|e| e.to_string())?;
    if let Err(e) = app.emit("settings", &settings) {
        log::warn!("[SETTINGS] Failed to emit settings: {e}");
    }
    Ok(())
}

#[tauri::command]
pub fn get_recents(store: tauri::State<'_, SettingsStore>) -> Vec<PathBuf> {
    store.recents()
}
