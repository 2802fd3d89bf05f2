use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

pub struct TextArea {}

impl<'a> TextArea {
    pub fn new(border_style: Style) -> tui_textarea::TextArea<'a> {
        let mut textarea = tui_textarea::TextArea::default();
        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(border_style)
                .title("Ask about visas, green cards or citizenship")
                .padding(Padding::new(1, 1, 0, 0)),
        );

        return textarea;
    }

    /// Trimmed text of the input box, or `None` when nothing worth sending
    /// was typed.
    pub fn submission(textarea: &tui_textarea::TextArea<'a>) -> Option<String> {
        let text = textarea.lines().join("\n");
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }

        return Some(trimmed.to_string());
    }
}
