//! RefViewer — Tauri application entry point.
//!
//! This is the app shell that wires together all domains and commands.
//! No business logic lives here — only module declarations, plugin
//! registration, state management and the command registry.
//!
//! The pipeline: an input source (file, data URI, clipboard, screenshot)
//! goes through intake into the session, which owns the current image and
//! the undo stack; the editor transforms it; the capture module runs the
//! screenshot-and-crop sub-flow.

pub mod capture;
mod commands;
pub mod editor;
pub mod history;
pub mod intake;
pub mod picture;
pub mod session;
pub mod settings;

use capture::CaptureState;
use commands::SessionState;
use settings::SettingsStore;

/// Entry point — called by the Tauri runtime.
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(SessionState::new())
        .manage(CaptureState::new())
        .manage(SettingsStore::new())
        .invoke_handler(tauri::generate_handler![
            // Loading (commands.rs)
            commands::load_file,
            commands::load_data,
            commands::paste_image,
            // Capture flow
            commands::start_capture,
            commands::select_region,
            commands::select_full_frame,
            commands::cancel_capture,
            // Editing
            commands::edit_image,
            commands::undo_edit,
            commands::clear_image,
            commands::get_palette,
            commands::save_image,
            // Settings and recents
            commands::get_settings,
            commands::write_settings,
            commands::get_recents,
        ])
        .setup(|app| {
            log::info!("RefViewer starting up");

            tauri::WebviewWindowBuilder::new(
                app,
                commands::MAIN_WINDOW,
                tauri::WebviewUrl::App("index.html".into()),
            )
            .title("RefViewer")
            .inner_size(960.0, 640.0)
            .min_inner_size(480.0, 320.0)
            .build()?;

            log::info!("Main window created — ready to load images");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("Error running RefViewer");
}
