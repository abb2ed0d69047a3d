//! Console transcript rendering.
//!
//! Draws the visible tail of the transcript plus the input line, one blended
//! text surface per row. The console draws a single monospace face; rows that
//! carry pending input get their own color so students can see what they have
//! typed but not yet submitted.

use sdl3::pixels::Color;
use sdl3::rect::Rect;
use sdl3::render::{Canvas, TextureCreator};
use sdl3::ttf::Font;
use sdl3::video::Window;

use super::ConsoleBuffer;

/// Inner padding between the window edge and the transcript, in pixels
pub const PADDING: u32 = 8;

const BG_COLOR: Color = Color::RGB(32, 33, 36);
const FG_COLOR: Color = Color::RGB(222, 222, 222);
const INPUT_COLOR: Color = Color::RGB(152, 195, 121);

/// Render one console frame.
pub fn draw_frame<T>(
    canvas: &mut Canvas<Window>,
    texture_creator: &TextureCreator<T>,
    font: &Font,
    buffer: &ConsoleBuffer,
    char_height: f32,
) -> Result<(), String> {
    canvas.set_draw_color(BG_COLOR);
    canvas.clear();

    let (_, window_h) = canvas.window().size_in_pixels();
    let visible = ((window_h.saturating_sub(PADDING * 2)) as f32 / char_height).floor() as usize;

    let mut y = PADDING as i32;
    for (row, is_input) in buffer.visible_rows(visible) {
        if !row.is_empty() {
            let color = if is_input { INPUT_COLOR } else { FG_COLOR };
            if let Some(surface) = safe_render_text(font, &row, color) {
                let texture = texture_creator
                    .create_texture_from_surface(&surface)
                    .map_err(|e| e.to_string())?;
                let rect = Rect::new(PADDING as i32, y, surface.width(), surface.height());
                canvas.copy(&texture, None, rect).map_err(|e| e.to_string())?;
            }
        }
        y += char_height as i32;
    }

    canvas.present();
    Ok(())
}

/// Render text to a surface, filtering out characters the font cannot draw.
fn safe_render_text(font: &Font, text: &str, color: Color) -> Option<sdl3::surface::Surface<'static>> {
    // First try to render the text as-is
    if let Ok(surface) = font.render(text).blended(color) {
        if surface.width() > 0 && surface.height() > 0 {
            return Some(surface);
        }
    }

    // If that fails, keep ASCII and characters the font can actually render
    let filtered: String = text
        .chars()
        .filter(|&ch| {
            if ch.is_ascii() || ch as u32 <= 0x024F {
                return true;
            }
            if let Ok(test_surface) = font.render_char(ch).blended(color) {
                test_surface.width() > 0 && test_surface.height() > 0
            } else {
                false
            }
        })
        .collect();

    if filtered.is_empty() {
        return None;
    }
    if let Ok(surface) = font.render(&filtered).blended(color) {
        if surface.width() > 0 && surface.height() > 0 {
            return Some(surface);
        }
    }

    None
}
