#[cfg(test)]
#[path = "chat_state_test.rs"]
mod tests;

use std::collections::HashMap;

use itertools::Itertools;

use super::parse_transcript;
use crate::domain::models::Action;
use crate::domain::models::ChatReply;
use crate::domain::models::ChatSession;
use crate::domain::models::Message;
use crate::domain::models::NetworkError;
use crate::domain::models::RequestToken;
use crate::domain::models::SessionEntry;
use crate::domain::models::DEFAULT_SESSION_TITLE;

const SIDEBAR_ID_MAX_CHARS: usize = 20;
const SIDEBAR_ID_KEEP_CHARS: usize = 17;

/// What the message pane should show.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatPane {
    LoadingSessions,
    LoadingHistory,
    BlockingError(String),
    Welcome,
    Thread { banner: Option<String> },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionRow {
    pub id: String,
    pub display_id: String,
    pub title: String,
    pub current: bool,
}

pub fn display_id(id: &str) -> String {
    if id.chars().count() <= SIDEBAR_ID_MAX_CHARS {
        return id.to_string();
    }

    let mut res = id.chars().take(SIDEBAR_ID_KEEP_CHARS).collect::<String>();
    res.push_str("...");
    return res;
}

/// Client side view of the assistant's sessions. Every mutation that needs
/// the backend returns the `Action` to perform, and every result is applied
/// back through the matching `apply_*` method with the token it was issued
/// with.
#[derive(Default)]
pub struct ChatState {
    session_ids: Vec<String>,
    entries: HashMap<String, SessionEntry>,
    current: Option<String>,
    initial: Option<String>,
    loading_sessions: bool,
    sending: bool,
    error: Option<String>,
    epoch: u64,
    generation: u64,
}

impl ChatState {
    pub fn token(&self) -> RequestToken {
        return RequestToken {
            epoch: self.epoch,
            generation: self.generation,
        };
    }

    pub fn session_ids(&self) -> &[String] {
        return &self.session_ids;
    }

    pub fn current_id(&self) -> Option<&str> {
        return self.current.as_deref();
    }

    pub fn is_sending(&self) -> bool {
        return self.sending;
    }

    pub fn refresh_sessions(&mut self) -> Action {
        self.loading_sessions = true;
        self.error = None;
        return Action::ListSessions(self.token());
    }

    pub fn apply_session_ids(
        &mut self,
        token: RequestToken,
        result: Result<Vec<String>, NetworkError>,
    ) -> Option<Action> {
        if token.epoch != self.epoch {
            tracing::debug!(?token, "discarding session list from a previous epoch");
            return None;
        }
        self.loading_sessions = false;
        let fresh = token.generation == self.generation;

        let ids = match result {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!(operation = %err.operation(), fresh, "request failed");
                if fresh {
                    self.error = Some(err.to_string());
                }
                return None;
            }
        };

        let mut ids = ids.into_iter().unique().collect::<Vec<String>>();
        for pinned in [&self.initial, &self.current].into_iter().flatten() {
            if !ids.contains(pinned) {
                ids.insert(0, pinned.to_string());
            }
        }

        for id in ids.iter() {
            self.entries
                .entry(id.to_string())
                .or_insert(SessionEntry::Placeholder);
        }
        self.session_ids = ids;

        if fresh && self.current.is_none() {
            let target = self
                .initial
                .take()
                .or_else(|| return self.session_ids.first().cloned());
            if let Some(id) = target {
                return self.select_session(&id);
            }
        }

        return None;
    }

    /// Session to open once the next list arrives, in place of the first
    /// one. Kept in the list even when the backend does not report it.
    pub fn open_on_load(&mut self, id: &str) {
        self.initial = Some(id.to_string());
    }

    pub fn select_session(&mut self, id: &str) -> Option<Action> {
        if !self.session_ids.iter().any(|e| return e == id) {
            return None;
        }

        if self.current.as_deref() != Some(id) {
            self.generation += 1;
            self.current = Some(id.to_string());
        }
        self.error = None;

        let token = self.token();
        let entry = self
            .entries
            .entry(id.to_string())
            .or_insert(SessionEntry::Placeholder);
        if *entry != SessionEntry::Placeholder {
            return None;
        }

        *entry = SessionEntry::Loading(token);
        return Some(Action::LoadHistory(token, id.to_string()));
    }

    pub fn apply_history(
        &mut self,
        token: RequestToken,
        id: &str,
        result: Result<String, NetworkError>,
    ) {
        if token.epoch != self.epoch {
            tracing::debug!(?token, id, "discarding history from a previous epoch");
            return;
        }

        let entry = match self.entries.get_mut(id) {
            Some(entry) if *entry == SessionEntry::Loading(token) => entry,
            _ => return,
        };

        match result {
            Ok(history) => {
                let messages = parse_transcript(&history);
                *entry = SessionEntry::Materialized(ChatSession::from_history(id, messages));
            }
            Err(err) => {
                tracing::warn!(operation = %err.operation(), id, "request failed");
                *entry = SessionEntry::Placeholder;
                if self.current.as_deref() == Some(id) {
                    self.error = Some(err.to_string());
                }
            }
        }
    }

    pub fn new_chat(&mut self) {
        if self.current.is_some() {
            self.generation += 1;
            self.current = None;
        }
        self.error = None;
    }

    pub fn send_message(&mut self, text: &str) -> Option<Action> {
        let question = text.trim();
        if question.is_empty() || self.sending {
            return None;
        }

        self.sending = true;
        self.error = None;
        return Some(Action::SendMessage(
            self.token(),
            self.current.clone(),
            question.to_string(),
        ));
    }

    pub fn apply_send(
        &mut self,
        token: RequestToken,
        sent_id: Option<&str>,
        question: &str,
        result: Result<ChatReply, NetworkError>,
    ) -> Option<Action> {
        if token.epoch != self.epoch {
            tracing::debug!(?token, "discarding reply from a previous epoch");
            return None;
        }
        self.sending = false;
        let fresh = token.generation == self.generation;

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(operation = %err.operation(), fresh, "request failed");
                if fresh {
                    self.error = Some(err.to_string());
                }
                return None;
            }
        };

        let id = reply.session_id;
        if sent_id != Some(id.as_str()) {
            self.session_ids.retain(|e| return *e != id);
            self.session_ids.insert(0, id.to_string());
            if fresh {
                self.current = Some(id.to_string());
            }
        }

        let answer = Message::new_response(&reply.answer);
        let next_token = self.token();
        match self.entries.get_mut(&id) {
            Some(SessionEntry::Materialized(session)) => {
                session.append(answer);
            }
            Some(SessionEntry::Loading(_)) => {}
            Some(entry) => {
                *entry = SessionEntry::Loading(next_token);
                return Some(Action::LoadHistory(next_token, id));
            }
            None => {
                let session = ChatSession::from_first_answer(&id, question, answer);
                self.entries
                    .insert(id.to_string(), SessionEntry::Materialized(session));
            }
        }

        return None;
    }

    /// Forgets everything the client knows. Results of requests issued
    /// before the reset are discarded when they arrive.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.session_ids.clear();
        self.entries.clear();
        self.current = None;
        self.initial = None;
        self.loading_sessions = false;
        self.sending = false;
        self.error = None;
    }

    pub fn current_session(&self) -> Option<&ChatSession> {
        return self
            .current
            .as_ref()
            .and_then(|id| return self.entries.get(id))
            .and_then(|entry| return entry.session());
    }

    pub fn current_title(&self) -> String {
        if let Some(session) = self.current_session() {
            return session.title.to_string();
        }
        if let Some(id) = &self.current {
            return ChatSession::placeholder_title(id);
        }

        return DEFAULT_SESSION_TITLE.to_string();
    }

    pub fn messages(&self) -> &[Message] {
        match self.current_session() {
            Some(session) => return &session.messages,
            None => return &[],
        }
    }

    pub fn is_loading_current(&self) -> bool {
        return self
            .current
            .as_ref()
            .and_then(|id| return self.entries.get(id))
            .map(|entry| return entry.is_loading())
            .unwrap_or(false);
    }

    pub fn input_disabled(&self) -> bool {
        return self.sending || self.loading_sessions || self.is_loading_current();
    }

    pub fn pane(&self) -> ChatPane {
        let has_messages = !self.messages().is_empty();

        if self.loading_sessions && !has_messages {
            return ChatPane::LoadingSessions;
        }
        if self.is_loading_current() {
            return ChatPane::LoadingHistory;
        }
        if let Some(err) = &self.error {
            if !has_messages {
                return ChatPane::BlockingError(err.to_string());
            }
        }
        if !has_messages {
            return ChatPane::Welcome;
        }

        return ChatPane::Thread {
            banner: self.error.clone(),
        };
    }

    pub fn sessions(&self) -> Vec<SessionRow> {
        return self
            .session_ids
            .iter()
            .map(|id| {
                let title = match self.entries.get(id).and_then(|e| return e.session()) {
                    Some(session) => session.title.to_string(),
                    None => ChatSession::placeholder_title(id),
                };

                return SessionRow {
                    id: id.to_string(),
                    display_id: display_id(id),
                    title,
                    current: self.current.as_deref() == Some(id.as_str()),
                };
            })
            .collect();
    }
}
