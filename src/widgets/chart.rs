//! Chart widget.
//!
//! Draws a small series either as labelled horizontal bars (`chartType =
//! "bar"`, the default) or as a one-line sparkline (any other type, treated as
//! a line chart). Values are scaled against the series maximum.
//!
//! # Example
//!
//! ```
//! use gridboard::widgets::{chart::ChartWidget, WidgetRenderer};
//! use gridboard::WidgetConfig;
//!
//! let config: WidgetConfig = serde_json::from_str(
//!     r#"{"id":"c","type":"chart","data":{"chartType":"line","values":[0,8]}}"#,
//! )
//! .expect("valid config");
//! assert_eq!(ChartWidget.render(&config).to_string(), "Untitled Widget\n▁█");
//! ```

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use serde_json::Value;

use super::WidgetRenderer;
use crate::WidgetConfig;

/// Registry key of the chart widget.
pub const TYPE: &str = "chart";

const DEFAULT_VALUES: [f64; 5] = [10.0, 20.0, 30.0, 40.0, 50.0];
const DEFAULT_LABELS: [&str; 5] = ["A", "B", "C", "D", "E"];

/// Widest bar, in cells.
const BAR_WIDTH: usize = 20;

const BAR_COLORS: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders the `values` series as a bar or line chart under the title.
pub struct ChartWidget;

impl ChartWidget {
    /// Constructor for the widget registry.
    pub fn create() -> Box<dyn WidgetRenderer> {
        Box::new(Self)
    }
}

impl WidgetRenderer for ChartWidget {
    fn render(&self, config: &WidgetConfig) -> Text<'static> {
        let values = values(config);
        let labels = labels(config);
        let max = values.iter().copied().fold(0.0_f64, f64::max);

        let mut lines = vec![Line::styled(
            config.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        match config.data_str("chartType").unwrap_or("bar") {
            "bar" => lines.extend(bar_lines(&values, &labels, max)),
            _ => lines.push(sparkline(&values, max)),
        }
        Text::from(lines)
    }

    fn kind(&self) -> &'static str {
        TYPE
    }
}

fn values(config: &WidgetConfig) -> Vec<f64> {
    match config.data.get("values") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_f64).collect(),
        _ => DEFAULT_VALUES.to_vec(),
    }
}

fn labels(config: &WidgetConfig) -> Vec<String> {
    match config.data.get("labels") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
    }
}

/// Fraction of the maximum, `0.0` when the series has no positive values.
fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn bar_lines(values: &[f64], labels: &[String], max: f64) -> Vec<Line<'static>> {
    let label_width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            let label = labels.get(index).map(String::as_str).unwrap_or("");
            let cells = (ratio(value, max) * BAR_WIDTH as f64).round() as usize;
            Line::from(vec![
                Span::raw(format!("{label:<label_width$} ")),
                Span::styled(
                    "█".repeat(cells),
                    Style::default().fg(BAR_COLORS[index % BAR_COLORS.len()]),
                ),
                Span::raw(format!(" {value}")),
            ])
        })
        .collect()
}

fn sparkline(values: &[f64], max: f64) -> Line<'static> {
    let top = (SPARK_LEVELS.len() - 1) as f64;
    let spark: String = values
        .iter()
        .map(|&value| SPARK_LEVELS[(ratio(value, max) * top).round() as usize])
        .collect();
    Line::styled(spark, Style::default().fg(Color::Blue))
}
