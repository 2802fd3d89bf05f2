use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use tui_textarea::Input;
use tui_textarea::Key;

use super::key_event;
use super::terminal_event;
use crate::domain::models::Event;

fn ctrl(c: char) -> Input {
    return Input {
        key: Key::Char(c),
        ctrl: true,
        alt: false,
    };
}

fn plain(key: Key) -> Input {
    return Input {
        key,
        ctrl: false,
        alt: false,
    };
}

#[test]
fn it_maps_ctrl_shortcuts() {
    assert!(matches!(key_event(ctrl('b')), Event::KeyboardCTRLB()));
    assert!(matches!(key_event(ctrl('c')), Event::KeyboardCTRLC()));
    assert!(matches!(key_event(ctrl('n')), Event::KeyboardCTRLN()));
    assert!(matches!(key_event(ctrl('r')), Event::KeyboardCTRLR()));
    assert!(matches!(key_event(ctrl('s')), Event::KeyboardCTRLS()));
    assert!(matches!(key_event(ctrl('d')), Event::UIScrollPageDown()));
    assert!(matches!(key_event(ctrl('u')), Event::UIScrollPageUp()));
}

#[test]
fn it_maps_navigation_keys() {
    assert!(matches!(key_event(plain(Key::Up)), Event::UIScrollUp()));
    assert!(matches!(key_event(plain(Key::Down)), Event::UIScrollDown()));
    assert!(matches!(
        key_event(plain(Key::PageDown)),
        Event::UIScrollPageDown()
    ));
    assert!(matches!(key_event(plain(Key::Enter)), Event::KeyboardEnter()));
    assert!(matches!(key_event(plain(Key::Esc)), Event::KeyboardEsc()));
}

#[test]
fn it_passes_other_keys_to_the_input() {
    match key_event(plain(Key::Char('b'))) {
        Event::KeyboardCharInput(input) => assert_eq!(input.key, Key::Char('b')),
        _ => panic!("Wrong enum"),
    }

    match key_event(ctrl('x')) {
        Event::KeyboardCharInput(input) => assert!(input.ctrl),
        _ => panic!("Wrong enum"),
    }
}

#[test]
fn it_converts_terminal_events() {
    let event = terminal_event(crossterm::event::Event::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )));
    assert!(matches!(event, Some(Event::KeyboardCTRLC())));

    let event = terminal_event(crossterm::event::Event::Paste("visa".to_string()));
    match event {
        Some(Event::KeyboardPaste(text)) => assert_eq!(text, "visa"),
        _ => panic!("Wrong enum"),
    }

    assert!(terminal_event(crossterm::event::Event::FocusGained).is_none());
}
