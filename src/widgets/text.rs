//! Free-text widget.
//!
//! Reads three `data` keys:
//!
//! | key        | default                    | effect                              |
//! |------------|----------------------------|-------------------------------------|
//! | `content`  | `Enter your text here...`  | body text, newlines preserved       |
//! | `color`    | none                       | foreground, any ratatui color name or `#rrggbb` |
//! | `fontSize` | `16px`                     | sizes of 20 and above render bold   |

use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;

use super::WidgetRenderer;
use crate::WidgetConfig;

/// Registry key of the text widget.
pub const TYPE: &str = "text";

/// Shown when the widget has no `content`.
pub const DEFAULT_CONTENT: &str = "Enter your text here...";

const DEFAULT_FONT_SIZE: u32 = 16;
const BOLD_FONT_SIZE: u32 = 20;

/// Renders the `content` string with optional color and emphasis.
pub struct TextWidget;

impl TextWidget {
    /// Constructor for the widget registry.
    pub fn create() -> Box<dyn WidgetRenderer> {
        Box::new(Self)
    }
}

impl WidgetRenderer for TextWidget {
    fn render(&self, config: &WidgetConfig) -> Text<'static> {
        let content = config
            .data_str("content")
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CONTENT)
            .to_string();

        let mut style = Style::default();
        if let Some(color) = config
            .data_str("color")
            .and_then(|c| Color::from_str(c).ok())
        {
            style = style.fg(color);
        }
        if font_size(config) >= BOLD_FONT_SIZE {
            style = style.add_modifier(Modifier::BOLD);
        }

        Text::styled(content, style)
    }

    fn kind(&self) -> &'static str {
        TYPE
    }
}

/// Reads `fontSize` as either a number or a CSS length such as `"24px"`.
fn font_size(config: &WidgetConfig) -> u32 {
    match config.data.get("fontSize") {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(DEFAULT_FONT_SIZE),
        Some(serde_json::Value::String(s)) => {
            let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(DEFAULT_FONT_SIZE)
        }
        _ => DEFAULT_FONT_SIZE,
    }
}
