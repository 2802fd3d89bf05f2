#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header;
use reqwest::RequestBuilder;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::domain::models::ApiOperation;
use crate::domain::models::ChatApi;
use crate::domain::models::ChatReply;
use crate::domain::models::NetworkError;

fn convert_err(operation: ApiOperation, err: reqwest::Error) -> NetworkError {
    tracing::error!(operation = %operation, error = ?err, "Assistant API request failed");

    if err.is_timeout() {
        return NetworkError::Timeout { operation };
    }

    if err.is_decode() {
        return NetworkError::Decode {
            operation,
            detail: err.to_string(),
        };
    }

    return NetworkError::Transport {
        operation,
        detail: err.to_string(),
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SessionIdsResponse {
    // The reference backend still answers with its older key.
    #[serde(rename = "sessionIds", alias = "all_sessions")]
    session_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct HistoryResponse {
    history: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SendMessageRequest {
    session_id: Option<String>,
    question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SendMessageResponse {
    answer: String,
    session_id: Option<String>,
}

pub struct HttpChatApi {
    client: reqwest::Client,
    url: String,
}

impl HttpChatApi {
    pub fn new(url: &str, timeout: Duration) -> Result<HttpChatApi> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        return Ok(HttpChatApi {
            client,
            url: url.to_string(),
        });
    }

    fn endpoint(&self, operation: ApiOperation, segments: &[&str]) -> Result<Url, NetworkError> {
        let invalid_url = |detail: String| {
            return NetworkError::Transport { operation, detail };
        };

        let mut url = Url::parse(&self.url).map_err(|err| return invalid_url(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| return invalid_url(format!("{} cannot be a base URL", self.url)))?
            .pop_if_empty()
            .extend(segments);

        return Ok(url);
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        req: RequestBuilder,
    ) -> Result<T, NetworkError> {
        let res = req
            .send()
            .await
            .map_err(|err| return convert_err(operation, err))?;

        let status = res.status();
        if !status.is_success() {
            tracing::error!(
                operation = %operation,
                status = status.as_u16(),
                "Assistant API returned an error status"
            );
            return Err(NetworkError::Status {
                operation,
                status: status.as_u16(),
            });
        }

        return res
            .json::<T>()
            .await
            .map_err(|err| return convert_err(operation, err));
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    #[allow(clippy::implicit_return)]
    async fn list_session_ids(&self) -> Result<Vec<String>, NetworkError> {
        let operation = ApiOperation::ListSessions;
        let url = self.endpoint(operation, &["chat-sessions"])?;
        let res: SessionIdsResponse = self.execute(operation, self.client.get(url)).await?;

        tracing::debug!(count = res.session_ids.len(), "Loaded session ids");
        return Ok(res.session_ids);
    }

    #[allow(clippy::implicit_return)]
    async fn get_history(&self, session_id: &str) -> Result<String, NetworkError> {
        let operation = ApiOperation::GetHistory;
        let url = self.endpoint(operation, &["history", session_id])?;
        let res: HistoryResponse = self.execute(operation, self.client.get(url)).await?;

        tracing::debug!(session_id, bytes = res.history.len(), "Loaded session history");
        return Ok(res.history);
    }

    #[allow(clippy::implicit_return)]
    async fn send_message(
        &self,
        session_id: Option<&str>,
        question: &str,
    ) -> Result<ChatReply, NetworkError> {
        let operation = ApiOperation::SendMessage;
        let url = self.endpoint(operation, &["chat"])?;
        let req = SendMessageRequest {
            session_id: session_id.map(|id| return id.to_string()),
            question: question.to_string(),
        };

        let res: SendMessageResponse = self
            .execute(operation, self.client.post(url).json(&req))
            .await?;

        let reply_session_id = match (res.session_id, session_id) {
            (Some(id), _) if !id.is_empty() => id,
            (_, Some(sent)) => sent.to_string(),
            _ => {
                tracing::error!("Assistant API did not return a session id for a new session");
                return Err(NetworkError::Decode {
                    operation,
                    detail: "response is missing session_id".to_string(),
                });
            }
        };

        return Ok(ChatReply {
            session_id: reply_session_id,
            answer: res.answer,
        });
    }
}
