#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
}

impl Message {
    pub fn new(id: &str, content: &str) -> Message {
        return Message {
            id: id.to_string(),
            content: content.to_string().replace('\t', "  "),
        };
    }

    /// Answers received from the chat endpoint are keyed by the moment they
    /// arrived, matching how the backend's own history never reuses them.
    pub fn new_response(content: &str) -> Message {
        let id = format!("response-{}", chrono::Utc::now().timestamp_millis());
        return Message::new(&id, content);
    }
}
