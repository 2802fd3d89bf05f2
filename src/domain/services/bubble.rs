#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use std::mem;

use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use super::markdown;
use super::Palette;
use crate::domain::models::Message;

const BUBBLE_LABEL: &str = "AskImmigrate";

pub struct Bubble<'a> {
    message: &'a Message,
    window_max_width: usize,
    spacing: usize,
}

pub struct BubbleConfig {
    /// left border + left padding + (text, not counted) + right padding + right border +
    /// scrollbar.
    pub border_elements_length: usize,
    pub outer_padding_percentage: f32,
}

fn width_of(spans: &[Span]) -> usize {
    return spans.iter().map(|e| return e.content.width()).sum();
}

/// Splits off the longest head of `text` that fits in `max_width` columns.
/// At least one character is taken so wide glyphs can't stall wrapping.
fn split_at_width(text: &str, max_width: usize) -> (String, String) {
    let mut width = 0;
    let mut end = 0;
    for (idx, c) in text.char_indices() {
        let char_width = c.width().unwrap_or(0);
        if width + char_width > max_width && idx > 0 {
            break;
        }
        width += char_width;
        end = idx + c.len_utf8();
    }

    return (text[..end].to_string(), text[end..].to_string());
}

/// Word wraps styled spans to `max_width` columns. Words longer than a whole
/// line are split.
fn wrap_spans(spans: Vec<Span<'static>>, max_width: usize) -> Vec<Vec<Span<'static>>> {
    let mut lines: Vec<Vec<Span<'static>>> = vec![];
    let mut current: Vec<Span<'static>> = vec![];
    let mut width = 0;

    for span in spans {
        let style = span.style;
        for (idx, word) in span.content.split(' ').enumerate() {
            if idx > 0 && width > 0 && width < max_width {
                current.push(Span::styled(" ", style));
                width += 1;
            }

            let mut rest = word.to_string();
            while !rest.is_empty() {
                let len = rest.width();
                if width + len <= max_width {
                    current.push(Span::styled(rest, style));
                    width += len;
                    break;
                }

                if width > 0 {
                    lines.push(mem::take(&mut current));
                    width = 0;
                    continue;
                }

                let (head, tail) = split_at_width(&rest, max_width);
                rest = tail;
                current.push(Span::styled(head, style));
                lines.push(mem::take(&mut current));
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    return lines;
}

impl<'a> Bubble<'a> {
    pub fn new(message: &'a Message, window_max_width: usize, spacing: usize) -> Bubble<'a> {
        return Bubble {
            message,
            window_max_width,
            spacing,
        };
    }

    pub fn style_config() -> BubbleConfig {
        return BubbleConfig {
            border_elements_length: 5,
            outer_padding_percentage: 0.04,
        };
    }

    fn get_max_text_width(&self) -> usize {
        let style_config = Bubble::style_config();
        // Add a minimum 4% of padding on the side.
        let min_bubble_padding_length = ((self.window_max_width as f32
            * style_config.outer_padding_percentage)
            .ceil()) as usize;

        let line_border_width = style_config.border_elements_length + min_bubble_padding_length;
        return self
            .window_max_width
            .saturating_sub(line_border_width)
            .max(BUBBLE_LABEL.len());
    }

    pub fn as_lines(&self, palette: &Palette) -> Vec<Line<'static>> {
        let max_text_width = self.get_max_text_width();

        let wrapped = markdown::to_lines(&self.message.content, palette.base, palette)
            .into_iter()
            .flat_map(|line| return wrap_spans(line.spans, max_text_width))
            .collect::<Vec<Vec<Span<'static>>>>();

        let inner_width = wrapped
            .iter()
            .map(|spans| return width_of(spans))
            .max()
            .unwrap_or(0)
            .max(BUBBLE_LABEL.len());

        let border = |text: String| return Span::styled(text, palette.border);
        let fill_style: Style = palette.base;

        let top_bar = format!("{}╮", "─".repeat(inner_width + 2 - BUBBLE_LABEL.len()));
        let mut lines = vec![Line::from(vec![
            border("╭".to_string()),
            Span::styled(BUBBLE_LABEL, palette.assistant),
            border(top_bar),
        ])];

        for mut spans in wrapped {
            let fill = " ".repeat(inner_width - width_of(&spans));
            let mut line = vec![border("│ ".to_string())];
            line.append(&mut spans);
            line.push(Span::styled(fill, fill_style));
            line.push(border(" │".to_string()));
            lines.push(Line::from(line));
        }

        lines.push(Line::from(border(format!(
            "╰{}╯",
            "─".repeat(inner_width + 2)
        ))));

        for _ in 0..self.spacing {
            lines.push(Line::from(""));
        }

        return lines;
    }
}
