//! Renderer configuration
//!
//! All sections are optional in a config file; anything omitted takes the
//! default shown on the corresponding `Default` impl.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ConfigError, ConfigResult};

/// Top-level renderer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Colour defaults and extra colour names
    pub palette: PaletteConfig,
    /// Glyphs and sizes for interactive elements
    pub widgets: WidgetConfig,
    /// Layout engine settings
    pub layout: LayoutConfig,
    /// Script extraction settings
    pub scripts: ScriptConfig,
}

/// Palette configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Default text colour name
    pub foreground: String,
    /// Default background colour name
    pub background: String,
    /// Extra names mapped onto palette colour names, e.g. `danger = "red"`
    pub aliases: HashMap<String, String>,
}

/// Interactive element configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Prefix painted before an unchecked checkbox label
    pub checkbox_unchecked: String,
    /// Prefix painted before a checked checkbox label
    pub checkbox_checked: String,
    /// Textbox width when the tag gives none
    pub textbox_width: usize,
    /// Largest width a `width:` attribute may ask for; larger values are clamped
    pub textbox_max_width: usize,
    /// Cursor glyph advertised for textboxes without a `blink` attribute
    pub textbox_blink: char,
}

/// Layout engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Pattern tiled by `<hr>` when the tag carries none
    pub rule_pattern: String,
    /// Drop a space run that lands at the start of a continuation row.
    ///
    /// `false` keeps every space fragment where plain greedy placement puts
    /// it, so a continuation row may begin with a space run.
    pub drop_wrap_spaces: bool,
}

/// Script extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Decorator owned by the script engine; never read as an event name
    pub reserved_decorator: String,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            foreground: "white".to_string(),
            background: "black".to_string(),
            aliases: HashMap::new(),
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            checkbox_unchecked: "[ ] ".to_string(),
            checkbox_checked: "[x] ".to_string(),
            textbox_width: 10,
            textbox_max_width: 256,
            textbox_blink: '_',
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rule_pattern: "-".to_string(),
            drop_wrap_spaces: true,
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            reserved_decorator: "Persist".to_string(),
        }
    }
}

impl RenderConfig {
    /// Check values the pipeline cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.widgets.textbox_width == 0 {
            return Err(ConfigError::Invalid(
                "widgets.textbox_width must be at least 1".to_string(),
            ));
        }
        if self.widgets.textbox_width > self.widgets.textbox_max_width {
            return Err(ConfigError::Invalid(format!(
                "widgets.textbox_width ({}) exceeds widgets.textbox_max_width ({})",
                self.widgets.textbox_width, self.widgets.textbox_max_width
            )));
        }
        if self.widgets.checkbox_unchecked.is_empty() || self.widgets.checkbox_checked.is_empty() {
            return Err(ConfigError::Invalid(
                "checkbox glyphs must not be empty".to_string(),
            ));
        }
        if self.layout.rule_pattern.is_empty() {
            return Err(ConfigError::Invalid(
                "layout.rule_pattern must not be empty".to_string(),
            ));
        }
        if self.scripts.reserved_decorator.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "scripts.reserved_decorator must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
