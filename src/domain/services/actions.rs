#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::Action;
use crate::domain::models::ChatApiBox;
use crate::domain::models::Event;

pub struct ActionsService {}

impl ActionsService {
    /// Runs one action against the API and wraps the outcome in the event
    /// the UI loop applies.
    pub async fn perform(api: &ChatApiBox, action: Action) -> Event {
        match action {
            Action::ListSessions(token) => {
                return Event::SessionIdsLoaded(token, api.list_session_ids().await);
            }
            Action::LoadHistory(token, session_id) => {
                let res = api.get_history(&session_id).await;
                return Event::HistoryLoaded(token, session_id, res);
            }
            Action::SendMessage(token, session_id, question) => {
                let res = api.send_message(session_id.as_deref(), &question).await;
                return Event::MessageSent(token, session_id, question, res);
            }
        }
    }

    /// Executes every action in its own task until the sending side closes.
    pub async fn start(
        api: ChatApiBox,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        while let Some(action) = rx.recv().await {
            tracing::debug!(?action, "performing action");

            let worker_api = api.clone();
            let worker_tx = tx.clone();
            tokio::spawn(async move {
                let event = ActionsService::perform(&worker_api, action).await;
                if worker_tx.send(event).is_err() {
                    tracing::debug!("event channel closed, dropping result");
                }
            });
        }

        return Ok(());
    }
}
