//! Theme tokens and the runtime theme derived from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_PRIMARY: &str = "#1976d2";
pub const DEFAULT_PRIMARY_LIGHT: &str = "#42a5f5";
pub const DEFAULT_PRIMARY_DARK: &str = "#1565c0";
pub const DEFAULT_SECONDARY: &str = "#dc004e";
pub const DEFAULT_ACCENT: &str = "#ff9800";
pub const DEFAULT_SUCCESS: &str = "#4caf50";
pub const DEFAULT_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_CARD_BACKGROUND: &str = "#f8f9fa";
pub const DEFAULT_HEADER_BACKGROUND: &str = "#fafafa";
pub const DEFAULT_HEADER_BAR_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_TEXT: &str = "#212121";
pub const DEFAULT_SECONDARY_TEXT: &str = "#757575";
pub const DEFAULT_DISABLED_TEXT: &str = "#bdbdbd";
pub const DEFAULT_BORDER: &str = "#e0e0e0";

/// Names accepted by [`ThemeTokens::preset`]
pub const PRESET_NAMES: [&str; 4] = ["research", "professional", "nature", "warm"];

/// Named color tokens authored on a survey document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_light: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_dark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_border: Option<String>,
}

/// Theme in the rendering engine's variable schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeTheme {
    pub css_variables: BTreeMap<String, String>,
    pub theme_name: String,
    pub color_palette: String,
    pub is_panelless: bool,
}

impl RuntimeTheme {
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.css_variables.get(name).map(String::as_str)
    }
}

#[allow(clippy::too_many_arguments)]
fn palette(
    primary: &str,
    primary_light: &str,
    primary_dark: &str,
    secondary: &str,
    accent: &str,
    success: &str,
    background: &str,
    card: &str,
    header: &str,
    text: &str,
    secondary_text: &str,
    disabled_text: &str,
    border: &str,
    focus: &str,
) -> ThemeTokens {
    ThemeTokens {
        primary_color: Some(primary.to_string()),
        primary_light: Some(primary_light.to_string()),
        primary_dark: Some(primary_dark.to_string()),
        secondary_color: Some(secondary.to_string()),
        accent_color: Some(accent.to_string()),
        success_color: Some(success.to_string()),
        background_color: Some(background.to_string()),
        card_background: Some(card.to_string()),
        header_background: Some(header.to_string()),
        text_color: Some(text.to_string()),
        secondary_text: Some(secondary_text.to_string()),
        disabled_text: Some(disabled_text.to_string()),
        border_color: Some(border.to_string()),
        focus_border: Some(focus.to_string()),
    }
}

impl ThemeTokens {
    /// The palette new documents start with and theme resets return to
    pub fn standard() -> Self {
        palette(
            DEFAULT_PRIMARY,
            DEFAULT_PRIMARY_LIGHT,
            DEFAULT_PRIMARY_DARK,
            DEFAULT_SECONDARY,
            DEFAULT_ACCENT,
            DEFAULT_SUCCESS,
            DEFAULT_BACKGROUND,
            DEFAULT_CARD_BACKGROUND,
            DEFAULT_HEADER_BAR_BACKGROUND,
            DEFAULT_TEXT,
            DEFAULT_SECONDARY_TEXT,
            DEFAULT_DISABLED_TEXT,
            DEFAULT_BORDER,
            DEFAULT_PRIMARY,
        )
    }

    /// Look up a named preset palette
    pub fn preset(name: &str) -> Option<Self> {
        let tokens = match name {
            "research" => palette(
                "#474747", "#6a6a6a", "#2e2e2e", "#ff9814", "#e50a3e", "#19b394", "#ffffff",
                "#f8f8f8", "#f3f3f3", "#000000", "#737373", "#737373", "#292929", "#437fd9",
            ),
            "professional" => palette(
                "#1976d2", "#42a5f5", "#1565c0", "#f57c00", "#ff9800", "#4caf50", "#ffffff",
                "#f8f9fa", "#fafafa", "#212121", "#616161", "#bdbdbd", "#e0e0e0", "#1976d2",
            ),
            "nature" => palette(
                "#4caf50", "#81c784", "#388e3c", "#ff9800", "#ffc107", "#8bc34a", "#f1f8e9",
                "#ffffff", "#e8f5e8", "#1b5e20", "#4caf50", "#a5d6a7", "#c8e6c9", "#4caf50",
            ),
            "warm" => palette(
                "#ff5722", "#ff8a65", "#d84315", "#ffc107", "#ff9800", "#4caf50", "#fff8f0",
                "#ffffff", "#ffeaa7", "#3e2723", "#6d4c41", "#bcaaa4", "#d7ccc8", "#ff5722",
            ),
            _ => return None,
        };
        Some(tokens)
    }

    /// Map the tokens onto the renderer's theme variables, substituting the
    /// fixed default for every absent token
    pub fn to_runtime(&self) -> RuntimeTheme {
        let pick = |token: &Option<String>, fallback: &str| -> String {
            token.clone().unwrap_or_else(|| fallback.to_string())
        };

        let primary = pick(&self.primary_color, DEFAULT_PRIMARY);
        let primary_light = pick(&self.primary_light, DEFAULT_PRIMARY_LIGHT);
        let accent = pick(&self.accent_color, DEFAULT_ACCENT);
        let success = pick(&self.success_color, DEFAULT_SUCCESS);
        let background = pick(&self.background_color, DEFAULT_BACKGROUND);
        let card = pick(&self.card_background, DEFAULT_CARD_BACKGROUND);
        let header_dim = pick(&self.header_background, DEFAULT_HEADER_BACKGROUND);
        let border = pick(&self.border_color, DEFAULT_BORDER);
        let focus = self.focus_border.clone().unwrap_or_else(|| primary.clone());

        let variables = [
            ("--sjs-general-backcolor", background.clone()),
            ("--sjs-general-backcolor-dark", card.clone()),
            ("--sjs-general-backcolor-dim", header_dim.clone()),
            ("--sjs-general-forecolor", pick(&self.text_color, DEFAULT_TEXT)),
            ("--sjs-general-forecolor-light", pick(&self.secondary_text, DEFAULT_SECONDARY_TEXT)),
            ("--sjs-general-dim-forecolor", pick(&self.disabled_text, DEFAULT_DISABLED_TEXT)),
            ("--sjs-primary-backcolor", primary.clone()),
            ("--sjs-primary-backcolor-light", primary_light.clone()),
            ("--sjs-primary-backcolor-dark", pick(&self.primary_dark, DEFAULT_PRIMARY_DARK)),
            ("--sjs-primary-forecolor", "#ffffff".to_string()),
            ("--sjs-secondary-backcolor", pick(&self.secondary_color, DEFAULT_SECONDARY)),
            ("--sjs-secondary-backcolor-light", accent.clone()),
            ("--sjs-secondary-backcolor-semi-light", success.clone()),
            ("--sjs-secondary-forecolor", "#ffffff".to_string()),
            ("--sjs-border-light", border.clone()),
            ("--sjs-border-default", border.clone()),
            ("--sjs-border-inside", border),
            ("--sjs-special-red", accent),
            ("--sjs-special-green", success),
            ("--sjs-special-blue", focus),
            ("--sjs-shadow-small", "0px 1px 2px 0px rgba(0, 0, 0, 0.15)".to_string()),
            ("--sjs-shadow-medium", "0px 2px 6px 0px rgba(0, 0, 0, 0.1)".to_string()),
            ("--sjs-shadow-large", "0px 8px 16px 0px rgba(0, 0, 0, 0.1)".to_string()),
            ("--sjs-shadow-inner", "inset 0px 1px 2px 0px rgba(0, 0, 0, 0.15)".to_string()),
            (
                "--sjs-header-backcolor",
                pick(&self.header_background, DEFAULT_HEADER_BAR_BACKGROUND),
            ),
            ("--sjs-corner-radius", "8px".to_string()),
            ("--sjs-base-unit", "8px".to_string()),
            ("--sjs-editor-backcolor", background),
            ("--sjs-editorpanel-backcolor", card.clone()),
            ("--sjs-editorpanel-hovercolor", primary_light),
            ("--sjs-progressbar-color", primary),
            ("--sjs-questionpanel-backcolor", card),
            ("--sjs-questionpanel-hovercolor", header_dim),
            ("--sjs-questionpanel-cornerradius", "8px".to_string()),
        ];

        RuntimeTheme {
            css_variables: variables
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            theme_name: "custom".to_string(),
            color_palette: "light".to_string(),
            is_panelless: false,
        }
    }
}
