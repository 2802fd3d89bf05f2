/// Session list panel. `selected` indexes the known session identifiers.
#[derive(Default)]
pub struct Sidebar {
    pub open: bool,
    pub selected: usize,
}

impl Sidebar {
    pub fn toggle(&mut self, current: Option<usize>) {
        self.open = !self.open;
        if self.open {
            self.selected = current.unwrap_or(0);
        }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn clamp(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}
