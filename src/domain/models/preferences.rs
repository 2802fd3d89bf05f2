#[cfg(test)]
#[path = "preferences_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

pub const EXPORT_VERSION: &str = "1.0";

/// Locales offered by the settings overlay. Any short code is accepted when
/// loaded from storage.
pub const LANGUAGES: [(&str, &str); 5] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("zh", "Chinese"),
];

fn cycle<T: IntoEnumIterator + PartialEq + Copy>(current: T, step: isize) -> T {
    let all = T::iter().collect::<Vec<T>>();
    let idx = all.iter().position(|e| return *e == current).unwrap_or(0) as isize;
    let len = all.len() as isize;
    return all[(idx + step).rem_euclid(len) as usize];
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    EnumVariantNames,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Auto,
}

impl Theme {
    pub fn cycle(self, step: isize) -> Theme {
        return cycle(self, step);
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    EnumVariantNames,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

impl FontSize {
    pub fn cycle(self, step: isize) -> FontSize {
        return cycle(self, step);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub theme: Theme,
    pub notifications: bool,
    pub font_size: FontSize,
    pub language: String,
}

impl Default for UserPreferences {
    fn default() -> UserPreferences {
        return UserPreferences {
            theme: Theme::Light,
            notifications: true,
            font_size: FontSize::Medium,
            language: "en".to_string(),
        };
    }
}

impl UserPreferences {
    pub fn language_name(&self) -> &str {
        return LANGUAGES
            .iter()
            .find(|(code, _)| return *code == self.language)
            .map(|(_, name)| return *name)
            .unwrap_or(self.language.as_str());
    }

    /// Moves to the neighbouring offered language. Unknown codes restart at
    /// the first entry.
    pub fn cycle_language(&mut self, step: isize) {
        let len = LANGUAGES.len() as isize;
        let next = match LANGUAGES
            .iter()
            .position(|(code, _)| return *code == self.language)
        {
            Some(idx) => (idx as isize + step).rem_euclid(len) as usize,
            None => 0,
        };

        self.language = LANGUAGES[next].0.to_string();
    }
}

/// Bundle written when the user exports their data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesExport {
    pub preferences: UserPreferences,
    pub export_date: String,
    pub version: String,
}
