use std::collections::HashMap;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::Bubble;
use super::Palette;
use crate::domain::models::Message;

#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

struct BubbleCacheEntry {
    id: String,
    content: String,
    lines: Vec<Line<'static>>,
}

pub struct BubbleList {
    cache: HashMap<usize, BubbleCacheEntry>,
    line_width: usize,
    lines_len: usize,
    palette: Palette,
    spacing: usize,
}

impl BubbleList {
    pub fn new(palette: Palette, spacing: usize) -> BubbleList {
        return BubbleList {
            cache: HashMap::new(),
            line_width: 0,
            lines_len: 0,
            palette,
            spacing,
        };
    }

    /// Changing the look invalidates every cached bubble.
    pub fn set_style(&mut self, palette: Palette, spacing: usize) {
        if self.palette != palette || self.spacing != spacing {
            self.cache.clear();
            self.palette = palette;
            self.spacing = spacing;
        }
    }

    pub fn set_messages(&mut self, messages: &[Message], line_width: usize) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }
        self.cache.retain(|idx, _| return *idx < messages.len());

        self.lines_len = messages
            .iter()
            .enumerate()
            .map(|(idx, message)| {
                if let Some(cache_entry) = self.cache.get(&idx) {
                    if cache_entry.id == message.id && cache_entry.content == message.content {
                        return cache_entry.lines.len();
                    }
                }

                let bubble_lines =
                    Bubble::new(message, line_width, self.spacing).as_lines(&self.palette);
                let bubble_line_len = bubble_lines.len();

                self.cache.insert(
                    idx,
                    BubbleCacheEntry {
                        id: message.id.to_string(),
                        content: message.content.to_string(),
                        lines: bubble_lines,
                    },
                );

                return bubble_line_len;
            })
            .sum();
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn is_empty(&self) -> bool {
        return self.lines_len == 0;
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, scroll: u16) {
        let mut indexes: Vec<usize> = self.cache.keys().cloned().collect();
        indexes.sort();
        let lines: Vec<Line<'static>> = indexes
            .iter()
            .filter_map(|idx| return self.cache.get(idx))
            .flat_map(|entry| return entry.lines.to_owned())
            .collect();

        frame.render_widget(
            Paragraph::new(lines)
                .style(self.palette.base)
                .block(Block::default())
                .scroll((scroll, 0)),
            rect,
        );
    }
}
