#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::path::PathBuf;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;

use super::BubbleList;
use super::ChatState;
use super::Palette;
use super::PreferencesStore;
use super::Scroll;
use super::SettingsIntent;
use super::SettingsPanel;
use super::Sidebar;
use super::Themes;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::FontSize;
use crate::domain::models::Loading;
use crate::domain::models::SlashCommand;
use crate::domain::models::TextArea;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /new (/n) - Start a new consultation. The session is created when the first answer arrives.
- /sessions (/s) - Toggle the session list.
- /open (/o) [SESSION_ID,SESSION_INDEX] - Opens a session. You can pass either the identifier, or the index from the session list.
- /refresh (/r) - Reload the session list from the assistant.
- /settings - Open the preferences panel.
- /export - Save your preferences to a dated JSON file in the data directory.
- /clear - Remove all stored data and reload. Asks for confirmation.
- /quit /exit (/q) - Exit AskImmigrate.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Up arrow - Scroll up, or move in the session list and settings
- Down arrow - Scroll down, or move in the session list and settings
- Left/Right arrow - Change the selected setting
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+B - Toggle the session list
- CTRL+N - New consultation
- CTRL+R - Reload the session list
- CTRL+S - Toggle settings
- ESC - Close the open panel
- CTRL+C - Exit.
        "#;

    return text.trim().to_string();
}

/// Blank lines between message bubbles for each font size.
pub fn bubble_spacing(font_size: FontSize) -> usize {
    match font_size {
        FontSize::Small => return 0,
        FontSize::Medium => return 1,
        FontSize::Large => return 2,
    }
}

pub struct AppState<'a> {
    pub bubble_list: BubbleList,
    pub chat: ChatState,
    pub confirm_clear: bool,
    pub export_dir: PathBuf,
    pub help_open: bool,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub loading: Loading,
    pub notice: Option<String>,
    pub palette: Palette,
    pub preferences: PreferencesStore,
    pub scroll: Scroll,
    pub settings: SettingsPanel,
    pub sidebar: Sidebar,
    pub textarea: tui_textarea::TextArea<'a>,
    ring_bell: bool,
}

impl<'a> AppState<'a> {
    pub fn new(preferences: PreferencesStore, export_dir: PathBuf) -> AppState<'a> {
        let palette = Themes::get(preferences.get().theme);
        let spacing = bubble_spacing(preferences.get().font_size);

        return AppState {
            bubble_list: BubbleList::new(palette, spacing),
            chat: ChatState::default(),
            confirm_clear: false,
            export_dir,
            help_open: false,
            last_known_height: 0,
            last_known_width: 0,
            loading: Loading::default(),
            notice: None,
            palette,
            preferences,
            scroll: Scroll::default(),
            settings: SettingsPanel::default(),
            sidebar: Sidebar::default(),
            textarea: TextArea::new(palette.border),
            ring_bell: false,
        };
    }

    /// Kicks off the first session list load. `session_id` is opened once
    /// the list arrives instead of the most recent session.
    pub fn start(
        &mut self,
        session_id: Option<String>,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<()> {
        if let Some(id) = session_id {
            self.chat.open_on_load(&id);
        }
        tx.send(self.chat.refresh_sessions())?;

        return Ok(());
    }

    /// Applies one event. Returns true when the application should exit.
    pub fn handle_event(
        &mut self,
        event: Event,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<bool> {
        match event {
            Event::SessionIdsLoaded(token, res) => {
                if let Some(action) = self.chat.apply_session_ids(token, res) {
                    tx.send(action)?;
                }
                self.sidebar.clamp(self.chat.session_ids().len());
                self.sync_dependants();
                self.scroll.last();
            }
            Event::HistoryLoaded(token, session_id, res) => {
                self.chat.apply_history(token, &session_id, res);
                self.sync_dependants();
                if self.chat.current_id() == Some(session_id.as_str()) {
                    self.scroll.last();
                }
            }
            Event::MessageSent(token, session_id, question, res) => {
                // Replies from before a clear-all are dropped silently.
                let answered = res.is_ok() && token.epoch == self.chat.token().epoch;
                if let Some(action) =
                    self.chat
                        .apply_send(token, session_id.as_deref(), &question, res)
                {
                    tx.send(action)?;
                }
                if answered && self.preferences.get().notifications {
                    self.ring_bell = true;
                }
                self.sync_dependants();
                self.scroll.last();
            }
            Event::KeyboardCTRLC() => {
                return Ok(true);
            }
            Event::KeyboardCTRLB() => {
                self.toggle_sidebar();
            }
            Event::KeyboardCTRLN() => {
                self.new_chat();
            }
            Event::KeyboardCTRLR() => {
                tx.send(self.chat.refresh_sessions())?;
            }
            Event::KeyboardCTRLS() => {
                self.settings.toggle();
            }
            Event::KeyboardEsc() => {
                self.close_top_panel();
            }
            Event::KeyboardEnter() => {
                return self.handle_enter(tx);
            }
            Event::KeyboardCharInput(input) => {
                self.handle_input(input, tx)?;
            }
            Event::KeyboardPaste(text) => {
                if !self.chat.is_sending() {
                    self.textarea.insert_str(text);
                }
            }
            Event::UIScrollDown() => {
                if self.settings.open {
                    self.settings.down();
                } else if self.sidebar.open {
                    self.sidebar.down(self.chat.session_ids().len());
                } else {
                    self.scroll.down();
                }
            }
            Event::UIScrollUp() => {
                if self.settings.open {
                    self.settings.up();
                } else if self.sidebar.open {
                    self.sidebar.up();
                } else {
                    self.scroll.up();
                }
            }
            Event::UIScrollPageDown() => {
                self.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                self.scroll.up_page();
            }
            Event::UITick() => {
                self.loading.tick();
            }
        }

        return Ok(false);
    }

    fn handle_input(&mut self, input: Input, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.confirm_clear {
            match input.key {
                Key::Char('y') | Key::Char('Y') => self.clear_all(true, tx)?,
                Key::Char('n') | Key::Char('N') => self.clear_all(false, tx)?,
                _ => {}
            }
            return Ok(());
        }

        if self.settings.open {
            let step = match input.key {
                Key::Left => -1,
                Key::Right => 1,
                _ => return Ok(()),
            };
            if let Some(intent) = self.settings.change(self.preferences.get(), step) {
                self.apply_settings_intent(intent);
            }
            return Ok(());
        }

        if !self.chat.is_sending() {
            self.textarea.input(input);
        }

        return Ok(());
    }

    fn handle_enter(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        // Clearing needs an explicit answer.
        if self.confirm_clear {
            return Ok(false);
        }

        if self.settings.open {
            if let Some(intent) = self.settings.activate(self.preferences.get()) {
                self.apply_settings_intent(intent);
            }
            return Ok(false);
        }

        if self.sidebar.open && TextArea::submission(&self.textarea).is_none() {
            let id = self.chat.session_ids().get(self.sidebar.selected).cloned();
            if let Some(id) = id {
                self.open_session(&id, tx)?;
                self.sidebar.open = false;
            }
            return Ok(false);
        }

        return self.submit(tx);
    }

    fn submit(&mut self, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        let text = match TextArea::submission(&self.textarea) {
            Some(text) => text,
            None => return Ok(false),
        };

        if let Some(command) = SlashCommand::parse(&text) {
            self.textarea = TextArea::new(self.palette.border);
            return self.handle_slash_command(command, tx);
        }

        if self.chat.input_disabled() {
            return Ok(false);
        }

        if let Some(action) = self.chat.send_message(&text) {
            tx.send(action)?;
            self.textarea = TextArea::new(self.palette.border);
            self.notice = None;
        }

        return Ok(false);
    }

    pub fn handle_slash_command(
        &mut self,
        command: SlashCommand,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<bool> {
        if command.is_quit() {
            return Ok(true);
        }

        if command.is_help() {
            self.help_open = true;
        } else if command.is_new_chat() {
            self.new_chat();
        } else if command.is_refresh() {
            tx.send(self.chat.refresh_sessions())?;
        } else if command.is_sessions() {
            self.toggle_sidebar();
        } else if command.is_open() {
            self.open_from_args(&command.args, tx)?;
        } else if command.is_settings() {
            self.settings.toggle();
        } else if command.is_export() {
            self.export();
        } else if command.is_clear() {
            self.confirm_clear = true;
        }

        return Ok(false);
    }

    fn open_from_args(&mut self, args: &[String], tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        let arg = match args.first() {
            Some(arg) => arg,
            None => {
                self.notice = Some(
                    "You must specify a session with `/open` or `/o`. Run `/help` for more details."
                        .to_string(),
                );
                return Ok(());
            }
        };

        let ids = self.chat.session_ids();
        let mut id = arg.to_string();
        if !ids.contains(&id) {
            if let Ok(idx) = arg.parse::<usize>() {
                if idx < 1 || idx > ids.len() {
                    self.notice = Some(format!("{idx} is not a valid index from the session list."));
                    return Ok(());
                }
                id = ids[idx - 1].to_string();
            }
        }

        if !self.chat.session_ids().contains(&id) {
            self.notice = Some(format!("No session named {id} found. Did you mistype it?"));
            return Ok(());
        }

        return self.open_session(&id, tx);
    }

    fn open_session(&mut self, id: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if let Some(action) = self.chat.select_session(id) {
            tx.send(action)?;
        }
        self.notice = None;
        self.sync_dependants();
        self.scroll.last();

        return Ok(());
    }

    fn new_chat(&mut self) {
        self.chat.new_chat();
        self.notice = None;
        self.sync_dependants();
    }

    fn toggle_sidebar(&mut self) {
        let current = self
            .chat
            .current_id()
            .and_then(|id| return self.chat.session_ids().iter().position(|e| return e == id));
        self.sidebar.toggle(current);
    }

    fn close_top_panel(&mut self) {
        if self.confirm_clear {
            self.confirm_clear = false;
        } else if self.help_open {
            self.help_open = false;
        } else if self.settings.open {
            self.settings.open = false;
        } else if self.sidebar.open {
            self.sidebar.open = false;
        } else {
            self.notice = None;
        }
    }

    fn apply_settings_intent(&mut self, intent: SettingsIntent) {
        match intent {
            SettingsIntent::Save(preferences) => {
                if let Err(err) = self.preferences.save(preferences) {
                    tracing::error!(error = ?err, "failed to save preferences");
                    self.notice = Some(format!("Failed to save preferences: {err}"));
                }
                self.apply_style();
            }
            SettingsIntent::Export => {
                self.export();
            }
            SettingsIntent::ClearAll => {
                self.confirm_clear = true;
            }
        }
    }

    fn export(&mut self) {
        match self.preferences.export_to_dir(&self.export_dir) {
            Ok(path) => {
                self.notice = Some(format!("Exported preferences to {}", path.display()));
            }
            Err(err) => {
                tracing::error!(error = ?err, "failed to export preferences");
                self.notice = Some(format!("Failed to export preferences: {err}"));
            }
        }
    }

    /// Runs the confirmed clear-all: stored data and preferences are dropped,
    /// every panel closes and the session list is fetched again.
    pub fn clear_all(&mut self, confirmed: bool, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        self.confirm_clear = false;
        let cleared = match self.preferences.clear_all(confirmed) {
            Ok(cleared) => cleared,
            Err(err) => {
                tracing::error!(error = ?err, "failed to clear stored data");
                self.notice = Some(format!("Failed to clear stored data: {err}"));
                return Ok(());
            }
        };
        if !cleared {
            return Ok(());
        }

        self.chat.reset();
        self.settings.open = false;
        self.sidebar = Sidebar::default();
        self.textarea = TextArea::new(self.palette.border);
        self.apply_style();
        self.notice = Some("Cleared all stored data.".to_string());
        tx.send(self.chat.refresh_sessions())?;

        return Ok(());
    }

    fn apply_style(&mut self) {
        let preferences = self.preferences.get();
        self.palette = Themes::get(preferences.theme);
        self.bubble_list
            .set_style(self.palette, bubble_spacing(preferences.font_size));

        let text = self.textarea.lines().join("\n");
        self.textarea = TextArea::new(self.palette.border);
        self.textarea.insert_str(text);

        self.sync_dependants();
    }

    /// Returns whether the terminal bell should ring, once per answer.
    pub fn take_bell(&mut self) -> bool {
        let ring = self.ring_bell;
        self.ring_bell = false;
        return ring;
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    fn sync_dependants(&mut self) {
        self.bubble_list
            .set_messages(self.chat.messages(), self.last_known_width.into());

        self.scroll.set_state(
            self.bubble_list.len().try_into().unwrap_or(u16::MAX),
            self.last_known_height,
        );
    }
}
