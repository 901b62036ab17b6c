use crate::overlay::asset::Glyph;
use crate::overlay::model::{Color, Point, TextStyle};

/// Drawing operations available to a paint handler for one frame.
///
/// The context is only handed out as a borrow for the duration of
/// [`PaintHandler::on_paint`], so it cannot outlive the frame.
pub trait DrawContext {
    fn draw_glyph(&mut self, glyph: &Glyph, at: Point);
    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle);
}

/// Callback invoked by the canvas each time it is repainted.
pub trait PaintHandler {
    fn on_paint(&self, ctx: &mut dyn DrawContext);
}

/// Backing store for a [`DoubleBufferedCanvas`].
///
/// `clear` and `back_buffer` only ever touch off-screen memory; `present` is
/// the single operation that reaches the visible surface.
pub trait Surface {
    fn clear(&mut self, color: Color);
    fn back_buffer(&mut self) -> &mut dyn DrawContext;
    fn present(&mut self);
}

pub struct DoubleBufferedCanvas<S: Surface> {
    surface: S,
    clear_color: Color,
    frames: u64,
}

impl<S: Surface> DoubleBufferedCanvas<S> {
    pub fn new(surface: S, clear_color: Color) -> Self {
        Self {
            surface,
            clear_color,
            frames: 0,
        }
    }

    /// Compose one frame off-screen and present it with a single blit.
    pub fn paint<H: PaintHandler + ?Sized>(&mut self, handler: &H) {
        self.surface.clear(self.clear_color);
        handler.on_paint(self.surface.back_buffer());
        self.surface.present();
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
