//! GUI subsystem wrapper.
//!
//! This module owns the pieces of SDL the library touches directly:
//! - Main-thread designation (GUI operations are only legal from the thread
//!   that ran the bootstrap)
//! - SDL context and video subsystem initialization with window hints
//! - The event loop that realizes the console window and pumps it while the
//!   program body runs on its background thread

use std::sync::OnceLock;
use std::thread::{self, ThreadId};

#[cfg(feature = "console")]
use std::collections::VecDeque;
#[cfg(feature = "console")]
use std::path::Path;
#[cfg(feature = "console")]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "console")]
use std::sync::mpsc::{Receiver, Sender};
#[cfg(feature = "console")]
use std::sync::Arc;

#[cfg(feature = "console")]
use arboard::Clipboard;
#[cfg(feature = "console")]
use sdl3::event::Event;
#[cfg(feature = "console")]
use sdl3::keyboard::Keycode;
#[cfg(feature = "console")]
use sdl3::video::Window;

#[cfg(feature = "console")]
use crate::console::{render, ConsoleBuffer, ConsoleSession};
#[cfg(feature = "console")]
use crate::font_discovery;
#[cfg(feature = "console")]
use crate::settings::Settings;

static MAIN_THREAD: OnceLock<ThreadId> = OnceLock::new();

/// Register the calling thread as the designated GUI main thread.
///
/// Designation is process-wide and permanent; only the first call has any
/// effect.
pub fn mark_main_thread() {
    let _ = MAIN_THREAD.set(thread::current().id());
}

/// Whether the calling thread is the designated GUI main thread.
pub fn is_main_thread() -> bool {
    MAIN_THREAD
        .get()
        .map_or(false, |id| *id == thread::current().id())
}

/// Initialized SDL context and video subsystem. No window exists yet; the
/// console window is realized by [`run_event_loop`].
pub struct GuiSubsystem {
    pub sdl: sdl3::Sdl,
    pub video: sdl3::VideoSubsystem,
}

impl GuiSubsystem {
    pub fn initialize() -> Result<Self, String> {
        let sdl = sdl3::init().map_err(|e| e.to_string())?;

        // Set window class name for proper desktop integration
        configure_hints();

        let video = sdl.video().map_err(|e| e.to_string())?;
        eprintln!("[INIT] GUI subsystem ready");

        Ok(GuiSubsystem { sdl, video })
    }
}

/// Configure SDL hints for proper window management
fn configure_hints() {
    sdl3::hint::set("SDL_VIDEO_X11_WMCLASS", "lectern");
    sdl3::hint::set("SDL_VIDEO_WAYLAND_WMCLASS", "lectern");
    sdl3::hint::set("SDL_VIDEO_WAYLAND_APP_ID", "lectern");
    sdl3::hint::set("SDL_APP_ID", "lectern");
    sdl3::hint::set("SDL_APP_NAME", "Lectern Console");
}

/// Run the console event loop on the designated main thread.
///
/// Creates the window, canvas and font, then pumps SDL events at ~60 Hz,
/// feeding program output into the transcript and typed lines back to
/// blocked readers. Returns when the program body is done and the window is
/// closed (or immediately after the body finishes, when `closeOnFinish` is
/// set).
#[cfg(feature = "console")]
pub fn run_event_loop(
    gui: &GuiSubsystem,
    session: &ConsoleSession,
    title: &str,
    settings: &Settings,
    signal_rx: Option<&Receiver<i32>>,
    program_done: &Arc<AtomicBool>,
) -> Result<(), String> {
    let ttf_context = sdl3::ttf::init().map_err(|e| e.to_string())?;

    let font_path = resolve_font_path(&settings.console.font_family)?;
    let font = ttf_context
        .load_font(&font_path, settings.console.font_size)
        .map_err(|e| format!("Font loading failed from {}: {}", font_path, e))?;
    eprintln!(
        "[CONSOLE] Loaded font: {} at size {:.1}",
        font_path, settings.console.font_size
    );

    let (char_w, char_h) = font.size_of_char('M').map_err(|e| e.to_string())?;
    let char_height = char_h as f32;

    let window_width = settings.console.columns * char_w as u32 + render::PADDING * 2;
    let window_height = settings.console.rows * char_h as u32 + render::PADDING * 2;

    let mut window = gui
        .video
        .window(title, window_width, window_height)
        .position_centered()
        .resizable()
        .high_pixel_density()
        .build()
        .map_err(|e| e.to_string())?;
    set_window_icon(&mut window);

    let mut canvas = window.into_canvas();
    let texture_creator = canvas.texture_creator();
    let mut event_pump = gui.sdl.event_pump().map_err(|e| e.to_string())?;

    // Enable text input for console typing
    canvas.window().subsystem().text_input().start(canvas.window());

    let mut buffer = ConsoleBuffer::new(
        settings.console.columns as usize,
        settings.console.scrollback_lines,
    );
    let mut pending_reads: VecDeque<Sender<String>> = VecDeque::new();
    let mut window_closed = false;
    let mut needs_render = true;

    'running: loop {
        // Orderly shutdown on OS signals
        if let Some(rx) = signal_rx {
            if let Ok(sig) = rx.try_recv() {
                eprintln!("[SIGNAL] Closing console on signal {}", sig);
                break 'running;
            }
        }

        // Drain program output into the transcript
        while let Ok(chunk) = session.output_rx.try_recv() {
            buffer.push_text(&chunk);
            needs_render = true;
        }

        // Collect read requests and satisfy them from submitted lines
        while let Ok(reply) = session.request_rx.try_recv() {
            pending_reads.push_back(reply);
        }
        while !pending_reads.is_empty() {
            match buffer.pop_ready_line() {
                Some(line) => {
                    if let Some(reply) = pending_reads.pop_front() {
                        let _ = reply.send(line);
                    }
                }
                None => break,
            }
        }

        // Collect all events first
        let mut events = Vec::new();
        // 16ms timeout keeps input responsive at ~60 FPS without busy polling
        if let Some(event) = event_pump.wait_event_timeout(16) {
            events.push(event);
        }
        for event in event_pump.poll_iter() {
            events.push(event);
        }

        for event in &events {
            match event {
                Event::Quit { .. } => {
                    window_closed = true;
                }

                Event::Window {
                    win_event: sdl3::event::WindowEvent::Resized(_width, _height),
                    ..
                } => {
                    needs_render = true;
                }

                Event::KeyDown { keycode, keymod, .. } => {
                    let Some(keycode) = keycode else {
                        continue;
                    };
                    let (is_ctrl, _is_shift) = modifiers(*keymod);
                    match *keycode {
                        Keycode::Return => {
                            buffer.submit_input();
                            needs_render = true;
                        }
                        Keycode::Backspace => {
                            buffer.backspace_input();
                            needs_render = true;
                        }
                        // No selection model; Ctrl+C copies the whole transcript
                        Keycode::C if is_ctrl => {
                            copy_transcript(&buffer);
                        }
                        _ => {}
                    }
                }

                Event::TextInput { ref text, .. } => {
                    buffer.append_input(text);
                    needs_render = true;
                }

                _ => {}
            }
        }

        if program_done.load(Ordering::SeqCst) {
            // No more reads can be issued; drop any that are still queued
            pending_reads.clear();
            if window_closed || settings.console.close_on_finish {
                break 'running;
            }
        } else if window_closed {
            // The window is gone but the body still runs; outstanding reads
            // can never be answered, so fail them by dropping the replies
            pending_reads.clear();
        }

        if needs_render && !window_closed {
            render::draw_frame(&mut canvas, &texture_creator, &font, &buffer, char_height)?;
            needs_render = false;
        }
    }

    eprintln!("[CONSOLE] Event loop finished");
    Ok(())
}

/// Extract control/shift modifier flags from an SDL keymod
#[cfg(feature = "console")]
fn modifiers(keymod: sdl3::keyboard::Mod) -> (bool, bool) {
    let is_ctrl =
        keymod.contains(sdl3::keyboard::Mod::LCTRLMOD) || keymod.contains(sdl3::keyboard::Mod::RCTRLMOD);
    let is_shift =
        keymod.contains(sdl3::keyboard::Mod::LSHIFTMOD) || keymod.contains(sdl3::keyboard::Mod::RSHIFTMOD);
    (is_ctrl, is_shift)
}

/// Resolve the console font path from settings or auto-discovery
#[cfg(feature = "console")]
fn resolve_font_path(font_family: &str) -> Result<String, String> {
    if font_family != "auto" {
        if Path::new(font_family).exists() {
            return Ok(font_family.to_string());
        }
        eprintln!(
            "[FONT] Font file not found: {}, falling back to auto-discovery",
            font_family
        );
    }
    font_discovery::find_best_monospace_font()
        .ok_or_else(|| "No suitable monospace font found on your system".to_string())
}

/// Copy the console transcript to the system clipboard
#[cfg(feature = "console")]
fn copy_transcript(buffer: &ConsoleBuffer) {
    match Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(buffer.transcript_text()) {
                eprintln!("[CONSOLE] Failed to copy transcript: {}", e);
            }
        }
        Err(e) => {
            eprintln!("[CONSOLE] Clipboard unavailable: {}", e);
        }
    }
}

/// Set the window icon from embedded PNG data
#[cfg(feature = "console")]
fn set_window_icon(window: &mut Window) {
    const ICON_DATA: &[u8] = include_bytes!("../icon.png");

    match image::load_from_memory(ICON_DATA) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            let pixels = rgba.into_raw();

            match create_sdl_surface_from_rgba(width, height, pixels) {
                Ok(surface) => {
                    window.set_icon(surface);
                }
                Err(e) => {
                    eprintln!("[CONSOLE] Failed to create icon surface: {}", e);
                }
            }
        }
        Err(e) => {
            eprintln!("[CONSOLE] Failed to load window icon: {}", e);
        }
    }
}

/// Create an SDL surface from RGBA pixel data
#[cfg(feature = "console")]
fn create_sdl_surface_from_rgba(
    width: u32,
    height: u32,
    pixels: Vec<u8>,
) -> Result<sdl3::surface::Surface<'static>, String> {
    let mut surface = sdl3::surface::Surface::new(width, height, sdl3::pixels::PixelFormat::RGBA32)
        .map_err(|e| format!("Failed to create SDL surface: {}", e))?;

    surface.with_lock_mut(|buffer: &mut [u8]| {
        buffer.copy_from_slice(&pixels);
    });

    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_thread_designation() {
        // Nothing else in this test binary marks a thread, so the first
        // mark wins and sticks to this thread.
        assert!(!is_main_thread());
        mark_main_thread();
        assert!(is_main_thread());

        let handle = thread::spawn(is_main_thread);
        assert!(!handle.join().unwrap());
    }

    #[cfg(feature = "console")]
    #[test]
    fn test_modifier_extraction() {
        use sdl3::keyboard::Mod;

        assert_eq!(modifiers(Mod::LCTRLMOD), (true, false));
        assert_eq!(modifiers(Mod::RCTRLMOD | Mod::LSHIFTMOD), (true, true));
        assert_eq!(modifiers(Mod::LALTMOD), (false, false));
    }
}
