//! Image widget.
//!
//! A terminal cannot show the picture itself, so the widget renders a framed
//! caption: the alt text, the source URL and the fit mode.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

use super::WidgetRenderer;
use crate::WidgetConfig;

/// Registry key of the image widget.
pub const TYPE: &str = "image";

/// Source shown when the widget has no `imageUrl`.
pub const DEFAULT_IMAGE_URL: &str = "https://via.placeholder.com/300x200?text=No+Image";

const DEFAULT_ALT_TEXT: &str = "Widget Image";
const DEFAULT_FIT_MODE: &str = "cover";

/// Renders `altText`, `imageUrl` and `fitMode`.
pub struct ImageWidget;

impl ImageWidget {
    /// Constructor for the widget registry.
    pub fn create() -> Box<dyn WidgetRenderer> {
        Box::new(Self)
    }
}

impl WidgetRenderer for ImageWidget {
    fn render(&self, config: &WidgetConfig) -> Text<'static> {
        let field = |key: &str, fallback: &str| {
            config
                .data_str(key)
                .filter(|s| !s.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        let url = field("imageUrl", DEFAULT_IMAGE_URL);
        let alt = field("altText", DEFAULT_ALT_TEXT);
        let fit = field("fitMode", DEFAULT_FIT_MODE);

        Text::from(vec![
            Line::from(vec![
                Span::raw("🖼  "),
                Span::styled(alt, Style::default().add_modifier(Modifier::BOLD)),
            ]),
            Line::styled(
                url,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Line::styled(
                format!("fit: {fit}"),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ])
    }

    fn kind(&self) -> &'static str {
        TYPE
    }
}
