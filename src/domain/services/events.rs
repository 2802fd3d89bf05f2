#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Event;

const TICK_INTERVAL: time::Duration = time::Duration::from_millis(500);

/// Shortcuts held with Ctrl.
const CTRL_SHORTCUTS: [(char, fn() -> Event); 7] = [
    ('b', Event::KeyboardCTRLB),
    ('c', Event::KeyboardCTRLC),
    ('d', Event::UIScrollPageDown),
    ('n', Event::KeyboardCTRLN),
    ('r', Event::KeyboardCTRLR),
    ('s', Event::KeyboardCTRLS),
    ('u', Event::UIScrollPageUp),
];

fn plain_key(key: &Key) -> Option<Event> {
    let event = match key {
        Key::Up | Key::MouseScrollUp => Event::UIScrollUp(),
        Key::Down | Key::MouseScrollDown => Event::UIScrollDown(),
        Key::PageUp => Event::UIScrollPageUp(),
        Key::PageDown => Event::UIScrollPageDown(),
        Key::Enter => Event::KeyboardEnter(),
        Key::Esc => Event::KeyboardEsc(),
        _ => return None,
    };

    return Some(event);
}

/// Everything that is not a shortcut is handed to the input box.
pub fn key_event(input: Input) -> Event {
    if input.ctrl {
        if let Key::Char(c) = input.key {
            let shortcut = CTRL_SHORTCUTS.iter().find(|(key, _)| return *key == c);
            if let Some((_, event)) = shortcut {
                return event();
            }
        }
    }

    return plain_key(&input.key).unwrap_or(Event::KeyboardCharInput(input));
}

fn terminal_event(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Paste(text) => return Some(Event::KeyboardPaste(text)),
        CrosstermEvent::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => return Some(Event::UIScrollUp()),
            MouseEventKind::ScrollDown => return Some(Event::UIScrollDown()),
            _ => return None,
        },
        CrosstermEvent::Key(key) => return Some(key_event(key.into())),
        _ => return None,
    }
}

/// Merges terminal input, worker results and a ticker into one stream.
pub struct EventsService {
    terminal: EventStream,
    worker: mpsc::UnboundedReceiver<Event>,
}

impl EventsService {
    pub fn new(worker: mpsc::UnboundedReceiver<Event>) -> EventsService {
        return EventsService {
            terminal: EventStream::new(),
            worker,
        };
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let event = tokio::select! {
                event = self.worker.recv() => event,
                event = self.terminal.next() => match event {
                    Some(Ok(event)) => terminal_event(event),
                    Some(Err(_)) => None,
                    None => None,
                },
                _ = time::sleep(TICK_INTERVAL) => Some(Event::UITick()),
            };

            if let Some(event) = event {
                return Ok(event);
            }
        }
    }
}
