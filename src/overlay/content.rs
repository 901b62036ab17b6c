use crate::overlay::asset::Glyph;
use crate::overlay::canvas::{DrawContext, PaintHandler};
use crate::overlay::model::{Point, TextStyle};
use crate::state::HelperState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_LABEL: &str = "No Tasks";
pub const DEFAULT_LABEL_OFFSET: (i32, i32) = (60, 85);

/// Where the helper is drawn on each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Track the live pointer position.
    #[default]
    FollowPointer,
    /// Stay at a fixed screen position.
    Fixed { x: i32, y: i32 },
}

/// Source of the global pointer position.
pub trait PointerSource {
    fn pointer_position(&self) -> Option<Point>;
}

impl<F> PointerSource for F
where
    F: Fn() -> Option<Point>,
{
    fn pointer_position(&self) -> Option<Point> {
        self()
    }
}

pub struct ContentProvider {
    state: Arc<HelperState>,
    glyph: Glyph,
    text_style: TextStyle,
    label_offset: (i32, i32),
    anchor: AnchorPolicy,
    pointer: Box<dyn PointerSource>,
}

impl ContentProvider {
    pub fn new(state: Arc<HelperState>, glyph: Glyph, pointer: Box<dyn PointerSource>) -> Self {
        Self {
            state,
            glyph,
            text_style: TextStyle::default(),
            label_offset: DEFAULT_LABEL_OFFSET,
            anchor: AnchorPolicy::default(),
            pointer,
        }
    }

    pub fn with_anchor(mut self, anchor: AnchorPolicy) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_text_style(mut self, style: TextStyle) -> Self {
        self.text_style = style;
        self
    }

    pub fn with_label_offset(mut self, offset: (i32, i32)) -> Self {
        self.label_offset = offset;
        self
    }

    /// Text shown next to the glyph: the most recent task, or the default
    /// label when there is none.
    pub fn label(&self) -> String {
        self.state
            .latest_task_name()
            .unwrap_or_else(|| DEFAULT_LABEL.to_string())
    }

    pub fn anchor_point(&self) -> Option<Point> {
        match self.anchor {
            AnchorPolicy::FollowPointer => self.pointer.pointer_position(),
            AnchorPolicy::Fixed { x, y } => Some(Point::new(x, y)),
        }
    }
}

impl PaintHandler for ContentProvider {
    fn on_paint(&self, ctx: &mut dyn DrawContext) {
        if !self.state.is_enabled() {
            return;
        }
        let Some(anchor) = self.anchor_point() else {
            tracing::trace!("pointer position unavailable; skipping frame");
            return;
        };
        let label = self.label();
        ctx.draw_glyph(&self.glyph, anchor);
        ctx.draw_text(
            &label,
            anchor.offset(self.label_offset.0, self.label_offset.1),
            &self.text_style,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::model::Color;

    #[test]
    fn fixed_anchor_ignores_pointer() {
        let provider = ContentProvider::new(
            Arc::new(HelperState::default()),
            Glyph::placeholder(2, 2, Color::default()),
            Box::new(|| Some(Point::new(500, 500))),
        )
        .with_anchor(AnchorPolicy::Fixed { x: 10, y: 20 });
        assert_eq!(provider.anchor_point(), Some(Point::new(10, 20)));
    }

    #[test]
    fn anchor_policy_serializes_with_mode_tag() {
        let json = serde_json::to_string(&AnchorPolicy::Fixed { x: 1, y: 2 }).unwrap();
        assert_eq!(json, r#"{"mode":"fixed","x":1,"y":2}"#);
        let back: AnchorPolicy = serde_json::from_str(r#"{"mode":"follow_pointer"}"#).unwrap();
        assert_eq!(back, AnchorPolicy::FollowPointer);
    }
}
