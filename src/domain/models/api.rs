#[cfg(test)]
#[path = "api_test.rs"]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ApiOperation {
    ListSessions,
    GetHistory,
    SendMessage,
}

impl ApiOperation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            ApiOperation::ListSessions => return "Failed to load session list",
            ApiOperation::GetHistory => return "Failed to load session history",
            ApiOperation::SendMessage => return "Failed to send message",
        }
    }
}

/// The single error category surfaced by the assistant API. Its display form
/// is the message shown to the user; the detail is kept for logs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("{}", .operation.failure_message())]
    Transport {
        operation: ApiOperation,
        detail: String,
    },

    #[error("{}", .operation.failure_message())]
    Timeout { operation: ApiOperation },

    #[error("{}", .operation.failure_message())]
    Status { operation: ApiOperation, status: u16 },

    #[error("{}", .operation.failure_message())]
    Decode {
        operation: ApiOperation,
        detail: String,
    },
}

impl NetworkError {
    pub fn operation(&self) -> ApiOperation {
        match self {
            NetworkError::Transport { operation, .. }
            | NetworkError::Timeout { operation }
            | NetworkError::Status { operation, .. }
            | NetworkError::Decode { operation, .. } => return *operation,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatReply {
    pub session_id: String,
    pub answer: String,
}

#[async_trait]
pub trait ChatApi {
    /// Identifiers of every consultation session the backend knows about.
    async fn list_session_ids(&self) -> Result<Vec<String>, NetworkError>;

    /// Raw transcript of a session, before it is split into messages.
    async fn get_history(&self, session_id: &str) -> Result<String, NetworkError>;

    /// Asks a question. Without a session identifier the backend allocates a
    /// new session and returns its identifier alongside the answer.
    async fn send_message(
        &self,
        session_id: Option<&str>,
        question: &str,
    ) -> Result<ChatReply, NetworkError>;
}

pub type ChatApiBox = Arc<dyn ChatApi + Send + Sync>;
