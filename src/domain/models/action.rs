/// Identifies the state a request was issued from, so that a result arriving
/// after the user moved on can be recognised as stale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestToken {
    /// Bumped whenever all client state is reset.
    pub epoch: u64,
    /// Bumped whenever the user navigates to another session.
    pub generation: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    ListSessions(RequestToken),
    LoadHistory(RequestToken, String),
    SendMessage(RequestToken, Option<String>, String),
}
