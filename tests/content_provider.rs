use desktop_helper::overlay::asset::Glyph;
use desktop_helper::overlay::model::{Color, Point, TextStyle, DEFAULT_TRANSPARENCY_KEY};
use desktop_helper::overlay::{
    AnchorPolicy, ContentProvider, DoubleBufferedCanvas, PaintHandler, DEFAULT_LABEL,
};
use desktop_helper::state::HelperState;
use desktop_helper::tasks::TaskItem;
use std::sync::Arc;

use mock_backend::{DrawOp, RecordingSurface, VisibleOp};

fn provider(state: &Arc<HelperState>, pointer: Point) -> ContentProvider {
    ContentProvider::new(
        Arc::clone(state),
        Glyph::placeholder(200, 200, DEFAULT_TRANSPARENCY_KEY),
        Box::new(move || Some(pointer)),
    )
}

fn paint_once(handler: &dyn PaintHandler) -> Vec<DrawOp> {
    let mut surface = RecordingSurface::default();
    handler.on_paint(&mut surface);
    surface.back
}

fn label_of(ops: &[DrawOp]) -> Option<String> {
    ops.iter().find_map(|op| match op {
        DrawOp::Text { text, .. } => Some(text.clone()),
        _ => None,
    })
}

#[test]
fn disabled_helper_never_draws() {
    let state = Arc::new(HelperState::new(false, vec![TaskItem::named("hidden")]));
    let provider = provider(&state, Point::new(10, 10));
    let mut surface = RecordingSurface::default();
    for _ in 0..100 {
        provider.on_paint(&mut surface);
    }
    assert!(surface.back.is_empty());
    assert!(surface.visible.is_empty());
}

#[test]
fn empty_task_list_shows_default_label() {
    let state = Arc::new(HelperState::default());
    let ops = paint_once(&provider(&state, Point::new(0, 0)));
    assert_eq!(label_of(&ops).as_deref(), Some(DEFAULT_LABEL));
    assert_eq!(DEFAULT_LABEL, "No Tasks");
}

#[test]
fn single_task_is_used_as_label() {
    let state = Arc::new(HelperState::new(true, vec![TaskItem::named("Water plants")]));
    let ops = paint_once(&provider(&state, Point::new(0, 0)));
    assert_eq!(label_of(&ops).as_deref(), Some("Water plants"));
}

#[test]
fn last_inserted_of_three_tasks_is_used_as_label() {
    let state = Arc::new(HelperState::new(
        true,
        vec![
            TaskItem::named("one"),
            TaskItem::named("two"),
            TaskItem::named("three"),
        ],
    ));
    let ops = paint_once(&provider(&state, Point::new(0, 0)));
    assert_eq!(label_of(&ops).as_deref(), Some("three"));
}

#[test]
fn glyph_and_label_are_anchored_at_pointer() {
    let state = Arc::new(HelperState::default());
    let ops = paint_once(&provider(&state, Point::new(300, 400)));
    assert_eq!(
        ops,
        vec![
            DrawOp::Glyph {
                at: Point::new(300, 400),
                size: (200, 200),
            },
            DrawOp::Text {
                text: DEFAULT_LABEL.to_string(),
                at: Point::new(360, 485),
                style: TextStyle::default(),
            },
        ]
    );
}

#[test]
fn fixed_anchor_and_custom_style_are_honoured() {
    let state = Arc::new(HelperState::default());
    let style = TextStyle {
        font_family: "Segoe UI".into(),
        size: 12,
        color: Color::rgb(255, 0, 0),
    };
    let provider = provider(&state, Point::new(999, 999))
        .with_anchor(AnchorPolicy::Fixed { x: 5, y: 6 })
        .with_label_offset((1, 2))
        .with_text_style(style.clone());
    let ops = paint_once(&provider);
    assert_eq!(
        ops[1],
        DrawOp::Text {
            text: DEFAULT_LABEL.to_string(),
            at: Point::new(6, 8),
            style,
        }
    );
}

#[test]
fn shared_state_changes_show_up_on_next_frame() {
    let state = Arc::new(HelperState::default());
    let provider = provider(&state, Point::new(0, 0));
    let mut canvas = DoubleBufferedCanvas::new(RecordingSurface::default(), DEFAULT_TRANSPARENCY_KEY);

    canvas.paint(&provider);
    state.push_task(TaskItem::named("fresh"));
    canvas.paint(&provider);
    state.set_enabled(false);
    canvas.paint(&provider);

    let labels: Vec<Option<String>> = canvas
        .surface()
        .visible
        .iter()
        .map(|VisibleOp::Blit(ops)| label_of(ops))
        .collect();
    assert_eq!(
        labels,
        vec![Some(DEFAULT_LABEL.to_string()), Some("fresh".to_string()), None]
    );
}

#[test]
fn missing_pointer_position_skips_the_frame() {
    let state = Arc::new(HelperState::default());
    let provider = ContentProvider::new(
        Arc::clone(&state),
        Glyph::placeholder(4, 4, DEFAULT_TRANSPARENCY_KEY),
        Box::new(|| -> Option<Point> { None }),
    );
    assert!(paint_once(&provider).is_empty());
}
