use tui_textarea::Input;

use super::ChatReply;
use super::NetworkError;
use super::RequestToken;

pub enum Event {
    SessionIdsLoaded(RequestToken, Result<Vec<String>, NetworkError>),
    HistoryLoaded(RequestToken, String, Result<String, NetworkError>),
    MessageSent(
        RequestToken,
        Option<String>,
        String,
        Result<ChatReply, NetworkError>,
    ),
    KeyboardCharInput(Input),
    KeyboardCTRLB(),
    KeyboardCTRLC(),
    KeyboardCTRLN(),
    KeyboardCTRLR(),
    KeyboardCTRLS(),
    KeyboardEnter(),
    KeyboardEsc(),
    KeyboardPaste(String),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
