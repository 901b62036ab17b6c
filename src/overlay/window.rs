use crate::overlay::model::{Color, Rect};

/// Extended window style bitmask (`GWL_EXSTYLE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ExStyle(pub u32);

impl ExStyle {
    /// `WS_EX_TRANSPARENT`: hit-testing falls through to windows underneath.
    pub const TRANSPARENT: ExStyle = ExStyle(0x0000_0020);
    /// `WS_EX_LAYERED`: required for colorkey transparency.
    pub const LAYERED: ExStyle = ExStyle(0x0008_0000);

    pub const fn union(self, other: ExStyle) -> ExStyle {
        ExStyle(self.0 | other.0)
    }

    pub const fn contains(self, other: ExStyle) -> bool {
        self.0 & other.0 == other.0
    }
}

/// The two style values an overlay toggles between, both fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStyles {
    original: ExStyle,
    passthrough: ExStyle,
}

impl WindowStyles {
    pub fn capture(original: ExStyle) -> Self {
        Self {
            original,
            passthrough: original
                .union(ExStyle::TRANSPARENT)
                .union(ExStyle::LAYERED),
        }
    }

    pub fn original(&self) -> ExStyle {
        self.original
    }

    pub fn passthrough(&self) -> ExStyle {
        self.passthrough
    }

    pub fn for_mode(&self, passthrough: bool) -> ExStyle {
        if passthrough {
            self.passthrough
        } else {
            self.original
        }
    }
}

/// Native window operations the overlay needs. The Win32 adapter is the only
/// production implementation; tests substitute fakes.
pub trait WindowBackend {
    /// Working area of the primary display.
    fn work_area(&self) -> Rect;
    /// Create the borderless, topmost, non-taskbar overlay window with `key`
    /// as both background and transparency color. Returns the extended style
    /// the window ended up with.
    fn create(&mut self, bounds: Rect, key: Color) -> anyhow::Result<ExStyle>;
    fn set_ex_style(&mut self, style: ExStyle);
    /// Put the overlay back at the top of the topmost band.
    fn bring_to_top(&mut self);
    /// Raise the canvas above any sibling inside the overlay window.
    fn bring_canvas_to_front(&mut self);
    /// Mark the canvas as needing a repaint.
    fn invalidate(&mut self);
}

/// Owner of the overlay window and its style state.
pub struct OverlayWindow<B: WindowBackend> {
    backend: B,
    bounds: Rect,
    styles: WindowStyles,
    passthrough: bool,
}

impl<B: WindowBackend> OverlayWindow<B> {
    /// Create the overlay over the primary work area and switch it into
    /// passthrough mode.
    pub fn create(mut backend: B, key: Color) -> anyhow::Result<Self> {
        let bounds = backend.work_area();
        let bounds = Rect::new(0, 0, bounds.width, bounds.height);
        let original = backend.create(bounds, key)?;
        let styles = WindowStyles::capture(original);
        tracing::info!(
            width = bounds.width,
            height = bounds.height,
            original = format_args!("{:#x}", styles.original().0),
            passthrough = format_args!("{:#x}", styles.passthrough().0),
            "overlay window created"
        );
        let mut window = Self {
            backend,
            bounds,
            styles,
            passthrough: false,
        };
        window.set_click_through(true);
        Ok(window)
    }

    /// Route input past the overlay (`true`) or let it be captured (`false`).
    pub fn set_click_through(&mut self, passthrough: bool) {
        let style = self.styles.for_mode(passthrough);
        self.backend.set_ex_style(style);
        if self.passthrough != passthrough {
            tracing::debug!(passthrough, style = format_args!("{:#x}", style.0), "overlay input mode");
        }
        self.passthrough = passthrough;
    }

    pub fn is_click_through(&self) -> bool {
        self.passthrough
    }

    pub fn styles(&self) -> WindowStyles {
        self.styles
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_adds_transparent_and_layered_bits() {
        let styles = WindowStyles::capture(ExStyle(0x0000_0088));
        assert_eq!(styles.original(), ExStyle(0x88));
        assert_eq!(styles.passthrough(), ExStyle(0x0008_00a8));
        assert!(styles.passthrough().contains(ExStyle::TRANSPARENT));
        assert!(!styles.original().contains(ExStyle::TRANSPARENT));
    }

    #[test]
    fn capture_of_already_layered_style_keeps_original_intact() {
        let styles = WindowStyles::capture(ExStyle::LAYERED);
        assert_eq!(styles.original(), ExStyle::LAYERED);
        assert_eq!(styles.for_mode(false), ExStyle::LAYERED);
        assert_eq!(
            styles.for_mode(true),
            ExStyle::LAYERED.union(ExStyle::TRANSPARENT)
        );
    }
}
