#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;

use super::Message;
use super::RequestToken;

pub const DEFAULT_SESSION_TITLE: &str = "New Immigration Consultation";

const TITLE_MAX_CHARS: usize = 50;

fn clip(text: &str) -> String {
    return text.chars().take(TITLE_MAX_CHARS).collect();
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Local>,
    pub last_activity: DateTime<Local>,
}

impl ChatSession {
    fn new(id: &str, title: String, messages: Vec<Message>) -> ChatSession {
        let now = Local::now();
        return ChatSession {
            id: id.to_string(),
            title,
            messages,
            created_at: now,
            last_activity: now,
        };
    }

    /// Title shown for a session whose history has not been fetched yet.
    pub fn placeholder_title(id: &str) -> String {
        return format!("Session {id}");
    }

    /// Builds a session from a parsed transcript, titled after its first
    /// message.
    pub fn from_history(id: &str, messages: Vec<Message>) -> ChatSession {
        let title = match messages.first() {
            Some(first) => {
                let cleaned = clip(&first.content).replace(['#', '*'], "");
                format!("{}...", cleaned.trim())
            }
            None => DEFAULT_SESSION_TITLE.to_string(),
        };

        return ChatSession::new(id, title, messages);
    }

    /// Builds the session the backend just allocated for `question`, holding
    /// only the answer.
    pub fn from_first_answer(id: &str, question: &str, answer: Message) -> ChatSession {
        let title = format!("{}...", clip(question));
        return ChatSession::new(id, title, vec![answer]);
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.last_activity = Local::now();
    }
}

/// Where a known session identifier stands in its lifecycle.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEntry {
    Placeholder,
    Loading(RequestToken),
    Materialized(ChatSession),
}

impl SessionEntry {
    pub fn session(&self) -> Option<&ChatSession> {
        match self {
            SessionEntry::Materialized(session) => return Some(session),
            _ => return None,
        }
    }

    pub fn is_loading(&self) -> bool {
        return matches!(self, SessionEntry::Loading(_));
    }
}
