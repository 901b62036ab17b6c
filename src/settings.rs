use crate::overlay::asset::avoid_key;
use crate::overlay::content::{AnchorPolicy, DEFAULT_LABEL_OFFSET};
use crate::overlay::model::{Color, TextStyle, DEFAULT_TEXT_COLOR, DEFAULT_TRANSPARENCY_KEY};
use crate::tasks::TASKS_FILE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives log output instead of stdout.
    #[serde(default)]
    pub log_file: Option<String>,
    /// JSON file holding the task list.
    #[serde(default = "default_tasks_path")]
    pub tasks_path: String,
    /// Whether the helper is drawn at startup.
    #[serde(default = "default_helper_enabled")]
    pub helper_enabled: bool,
    #[serde(default)]
    pub overlay: OverlaySettings,
}

fn default_tasks_path() -> String {
    TASKS_FILE.to_string()
}

fn default_helper_enabled() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            tasks_path: default_tasks_path(),
            helper_enabled: default_helper_enabled(),
            overlay: OverlaySettings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Appearance and timing of the on-screen helper.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OverlaySettings {
    /// Sleep between idle repaint cycles, in milliseconds.
    pub repaint_interval_ms: u64,
    pub anchor: AnchorPolicy,
    /// Label position relative to the anchor.
    pub label_offset: (i32, i32),
    pub glyph_size: (u32, u32),
    pub font_family: String,
    /// Font size in points.
    pub font_size: i32,
    /// `#RRGGBB`.
    pub text_color: String,
    /// `#RRGGBB`. Pixels of exactly this color are see-through.
    pub transparency_key: String,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            repaint_interval_ms: 8,
            anchor: AnchorPolicy::FollowPointer,
            label_offset: DEFAULT_LABEL_OFFSET,
            glyph_size: (200, 200),
            font_family: "Arial".into(),
            font_size: 16,
            text_color: "#0000FF".into(),
            transparency_key: "#000000".into(),
        }
    }
}

impl OverlaySettings {
    pub fn repaint_interval(&self) -> Duration {
        Duration::from_millis(self.repaint_interval_ms.max(1))
    }

    pub fn transparency_key(&self) -> Color {
        Color::parse_hex(&self.transparency_key).unwrap_or_else(|| {
            tracing::warn!(value = %self.transparency_key, "invalid transparency key; using default");
            DEFAULT_TRANSPARENCY_KEY
        })
    }

    /// Label style. The text color is kept off the transparency key so the
    /// label never disappears.
    pub fn text_style(&self) -> TextStyle {
        let color = Color::parse_hex(&self.text_color).unwrap_or_else(|| {
            tracing::warn!(value = %self.text_color, "invalid text color; using default");
            DEFAULT_TEXT_COLOR
        });
        TextStyle {
            font_family: self.font_family.clone(),
            size: self.font_size.max(1),
            color: avoid_key(color, self.transparency_key()),
        }
    }
}
