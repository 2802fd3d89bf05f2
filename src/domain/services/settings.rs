#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

use strum::EnumIter;
use strum::IntoEnumIterator;

use crate::domain::models::UserPreferences;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum SettingsField {
    Theme,
    FontSize,
    Notifications,
    Language,
    Export,
    ClearAll,
}

impl SettingsField {
    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::Theme => return "Theme",
            SettingsField::FontSize => return "Font size",
            SettingsField::Notifications => return "Notifications",
            SettingsField::Language => return "Language",
            SettingsField::Export => return "Export data",
            SettingsField::ClearAll => return "Clear all data",
        }
    }
}

/// What the settings overlay asks the application to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingsIntent {
    Save(UserPreferences),
    Export,
    ClearAll,
}

#[derive(Default)]
pub struct SettingsPanel {
    pub open: bool,
    selected: usize,
}

impl SettingsPanel {
    pub fn toggle(&mut self) {
        self.open = !self.open;
        self.selected = 0;
    }

    pub fn selected(&self) -> SettingsField {
        return SettingsField::iter()
            .nth(self.selected)
            .unwrap_or(SettingsField::Theme);
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.selected + 1 < SettingsField::iter().count() {
            self.selected += 1;
        }
    }

    /// Steps the selected value left (`-1`) or right (`1`).
    pub fn change(&self, preferences: &UserPreferences, step: isize) -> Option<SettingsIntent> {
        let mut next = preferences.clone();
        match self.selected() {
            SettingsField::Theme => next.theme = next.theme.cycle(step),
            SettingsField::FontSize => next.font_size = next.font_size.cycle(step),
            SettingsField::Notifications => next.notifications = !next.notifications,
            SettingsField::Language => next.cycle_language(step),
            SettingsField::Export | SettingsField::ClearAll => return None,
        }

        return Some(SettingsIntent::Save(next));
    }

    /// Enter on a row: toggles values and triggers the data actions.
    pub fn activate(&self, preferences: &UserPreferences) -> Option<SettingsIntent> {
        match self.selected() {
            SettingsField::Export => return Some(SettingsIntent::Export),
            SettingsField::ClearAll => return Some(SettingsIntent::ClearAll),
            _ => return self.change(preferences, 1),
        }
    }

    pub fn rows(&self, preferences: &UserPreferences) -> Vec<(SettingsField, String)> {
        return SettingsField::iter()
            .map(|field| {
                let value = match field {
                    SettingsField::Theme => preferences.theme.to_string(),
                    SettingsField::FontSize => preferences.font_size.to_string(),
                    SettingsField::Notifications => {
                        if preferences.notifications {
                            "on".to_string()
                        } else {
                            "off".to_string()
                        }
                    }
                    SettingsField::Language => preferences.language_name().to_string(),
                    SettingsField::Export | SettingsField::ClearAll => "".to_string(),
                };
                return (field, value);
            })
            .collect();
    }
}
