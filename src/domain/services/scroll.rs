#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;

use ratatui::widgets::ScrollbarState;

const PAGE_LINES: u16 = 10;

/// Vertical offset of the message pane, kept in sync with its scrollbar.
#[derive(Default)]
pub struct Scroll {
    list_length: u16,
    viewport_length: u16,
    pub position: u16,
    pub scrollbar_state: ScrollbarState,
}

impl Scroll {
    fn max_position(&self) -> u16 {
        return self.list_length.saturating_sub(self.viewport_length);
    }

    fn move_to(&mut self, position: u16) {
        self.position = position.min(self.max_position());
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn up(&mut self) {
        self.move_to(self.position.saturating_sub(1));
    }

    pub fn up_page(&mut self) {
        self.move_to(self.position.saturating_sub(PAGE_LINES));
    }

    pub fn down(&mut self) {
        self.move_to(self.position.saturating_add(1));
    }

    pub fn down_page(&mut self) {
        self.move_to(self.position.saturating_add(PAGE_LINES));
    }

    /// Jumps to the newest message.
    pub fn last(&mut self) {
        self.move_to(self.max_position());
    }

    pub fn set_state(&mut self, list_length: u16, viewport_length: u16) {
        self.list_length = list_length;
        self.viewport_length = viewport_length;
        self.scrollbar_state = self
            .scrollbar_state
            .content_length(list_length)
            .viewport_content_length(viewport_length);
        self.move_to(self.position);
    }
}
