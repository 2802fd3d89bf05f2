use ratatui::prelude::Alignment;
use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const FRAMES: [&str; 4] = ["", ".", "..", "..."];

/// Busy indicator shown in place of the input box while a question is
/// waiting for its answer.
#[derive(Default)]
pub struct Loading {
    tick: usize,
}

impl Loading {
    pub fn tick(&mut self) {
        self.tick = (self.tick + 1) % FRAMES.len();
    }

    pub fn text(&self) -> String {
        return format!("Consulting the assistant{}", FRAMES[self.tick]);
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, border_style: Style) {
        frame.render_widget(
            Paragraph::new(self.text())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Double)
                        .border_style(border_style)
                        .padding(Padding::new(1, 1, 0, 0)),
                )
                .alignment(Alignment::Center),
            rect,
        );
    }
}
