use std::path::Path;

use anyhow::bail;
use anyhow::Result;
use ratatui::backend::TestBackend;
use ratatui::prelude::Rect;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tui_textarea::Input;
use tui_textarea::Key;

use super::AppState;
use crate::domain::models::Action;
use crate::domain::models::ChatReply;
use crate::domain::models::Event;
use crate::domain::models::Theme;
use crate::domain::models::UserPreferences;
use crate::domain::services::PreferencesStore;
use crate::domain::services::Themes;
use crate::infrastructure::storage::memory::MemoryStorage;

fn app_state(dir: &Path) -> AppState<'static> {
    let store = PreferencesStore::load(Box::<MemoryStorage>::default());
    let mut app_state = AppState::new(store, dir.to_path_buf());
    app_state.set_rect(Rect::new(0, 0, 80, 30));
    return app_state;
}

fn key(c: char) -> Event {
    return Event::KeyboardCharInput(Input {
        key: Key::Char(c),
        ctrl: false,
        alt: false,
    });
}

fn submit(
    app_state: &mut AppState,
    text: &str,
    tx: &mpsc::UnboundedSender<Action>,
) -> Result<bool> {
    app_state.textarea.insert_str(text);
    return app_state.handle_event(Event::KeyboardEnter(), tx);
}

/// Loads the session list `ids` and returns the action the state asked for.
fn load_sessions(
    app_state: &mut AppState,
    ids: &[&str],
    tx: &mpsc::UnboundedSender<Action>,
    rx: &mut mpsc::UnboundedReceiver<Action>,
) -> Result<Option<Action>> {
    let token = match rx.try_recv()? {
        Action::ListSessions(token) => token,
        _ => bail!("Wrong enum"),
    };
    let ids = ids.iter().map(|e| return e.to_string()).collect();
    app_state.handle_event(Event::SessionIdsLoaded(token, Ok(ids)), tx)?;

    return Ok(rx.try_recv().ok());
}

/// Opens `id` and answers its history request with `history`.
fn open_with_history(
    app_state: &mut AppState,
    id: &str,
    history: &str,
    tx: &mpsc::UnboundedSender<Action>,
    rx: &mut mpsc::UnboundedReceiver<Action>,
) -> Result<()> {
    submit(app_state, &format!("/open {id}"), tx)?;
    let token = match rx.try_recv()? {
        Action::LoadHistory(token, _) => token,
        _ => bail!("Wrong enum"),
    };
    app_state.handle_event(
        Event::HistoryLoaded(token, id.to_string(), Ok(history.to_string())),
        tx,
    )?;

    return Ok(());
}

fn rendered_bubbles(app_state: &AppState) -> Result<String> {
    let mut terminal = Terminal::new(TestBackend::new(80, 30))?;
    terminal.draw(|frame| {
        let rect = frame.size();
        app_state.bubble_list.render(frame, rect, 0);
    })?;

    let text = terminal
        .backend()
        .buffer()
        .content
        .iter()
        .map(|cell| return cell.symbol.to_string())
        .collect::<String>();

    return Ok(text);
}

mod handle_slash_commands {
    use super::*;

    #[test]
    fn it_breaks_on_quit() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());

        assert!(submit(&mut app_state, "/q", &tx)?);
        assert!(rx.try_recv().is_err());

        return Ok(());
    }

    #[test]
    fn it_opens_help() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());

        assert!(!submit(&mut app_state, "/help", &tx)?);
        assert!(app_state.help_open);

        app_state.handle_event(Event::KeyboardEsc(), &tx)?;
        assert!(!app_state.help_open);

        return Ok(());
    }

    #[test]
    fn it_opens_sessions_by_index() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.start(None, &tx)?;
        load_sessions(&mut app_state, &["a", "b"], &tx, &mut rx)?;

        submit(&mut app_state, "/open 2", &tx)?;

        match rx.try_recv()? {
            Action::LoadHistory(_, id) => assert_eq!(id, "b"),
            _ => bail!("Wrong enum"),
        }
        assert_eq!(app_state.chat.current_id(), Some("b"));
        assert_eq!(app_state.textarea.lines(), [""]);

        return Ok(());
    }

    #[test]
    fn it_rejects_unknown_sessions() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.start(None, &tx)?;
        load_sessions(&mut app_state, &["a"], &tx, &mut rx)?;

        submit(&mut app_state, "/open 5", &tx)?;
        assert_eq!(
            app_state.notice,
            Some("5 is not a valid index from the session list.".to_string())
        );

        submit(&mut app_state, "/o nope", &tx)?;
        assert_eq!(
            app_state.notice,
            Some("No session named nope found. Did you mistype it?".to_string())
        );
        assert!(rx.try_recv().is_err());

        return Ok(());
    }

    #[test]
    fn it_exports_preferences() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());

        submit(&mut app_state, "/export", &tx)?;

        let notice = app_state.notice.clone().unwrap();
        assert!(notice.starts_with("Exported preferences to "));
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);

        return Ok(());
    }

    #[test]
    fn it_clears_all_data_once_confirmed() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.preferences.save(UserPreferences {
            theme: Theme::Dark,
            ..UserPreferences::default()
        })?;
        app_state.start(None, &tx)?;
        load_sessions(&mut app_state, &["a"], &tx, &mut rx)?;

        submit(&mut app_state, "/clear", &tx)?;
        assert!(app_state.confirm_clear);
        assert_eq!(app_state.preferences.get().theme, Theme::Dark);

        app_state.handle_event(key('y'), &tx)?;

        assert!(!app_state.confirm_clear);
        assert_eq!(app_state.preferences.get(), &UserPreferences::default());
        assert_eq!(app_state.palette, Themes::get(Theme::Light));
        assert_eq!(app_state.chat.session_ids().len(), 0);
        assert_eq!(app_state.chat.current_id(), None);
        match rx.try_recv()? {
            Action::ListSessions(token) => assert_eq!(token.epoch, 1),
            _ => bail!("Wrong enum"),
        }

        return Ok(());
    }

    #[test]
    fn it_ignores_enter_while_confirming_clear() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.preferences.save(UserPreferences {
            theme: Theme::Dark,
            ..UserPreferences::default()
        })?;

        submit(&mut app_state, "/clear", &tx)?;
        app_state.handle_event(Event::KeyboardEnter(), &tx)?;

        assert!(app_state.confirm_clear);
        assert_eq!(app_state.preferences.get().theme, Theme::Dark);
        assert!(rx.try_recv().is_err());

        return Ok(());
    }

    #[test]
    fn it_keeps_data_when_clear_is_cancelled() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.preferences.save(UserPreferences {
            theme: Theme::Dark,
            ..UserPreferences::default()
        })?;

        submit(&mut app_state, "/clear", &tx)?;
        app_state.handle_event(Event::KeyboardEsc(), &tx)?;

        assert!(!app_state.confirm_clear);
        assert_eq!(app_state.preferences.get().theme, Theme::Dark);
        assert!(rx.try_recv().is_err());

        return Ok(());
    }
}

mod handle_event {
    use super::*;

    #[test]
    fn it_breaks_on_ctrl_c() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());

        assert!(app_state.handle_event(Event::KeyboardCTRLC(), &tx)?);
        return Ok(());
    }

    #[test]
    fn it_sends_messages() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());

        assert!(!submit(&mut app_state, "  What is OPT?  ", &tx)?);

        match rx.try_recv()? {
            Action::SendMessage(_, session_id, question) => {
                assert_eq!(session_id, None);
                assert_eq!(question, "What is OPT?");
            }
            _ => bail!("Wrong enum"),
        }
        assert!(app_state.chat.is_sending());
        assert_eq!(app_state.textarea.lines(), [""]);

        // Typing is ignored until the answer arrives.
        app_state.handle_event(key('x'), &tx)?;
        assert_eq!(app_state.textarea.lines(), [""]);

        return Ok(());
    }

    #[test]
    fn it_keeps_input_while_sessions_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.start(None, &tx)?;
        rx.try_recv()?;

        submit(&mut app_state, "Hello", &tx)?;

        assert!(rx.try_recv().is_err());
        assert_eq!(app_state.textarea.lines(), ["Hello"]);

        return Ok(());
    }

    #[test]
    fn it_opens_requested_session_first() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.start(Some("b".to_string()), &tx)?;

        let action = load_sessions(&mut app_state, &["a", "b"], &tx, &mut rx)?;

        match action {
            Some(Action::LoadHistory(_, id)) => assert_eq!(id, "b"),
            _ => bail!("Wrong enum"),
        }
        return Ok(());
    }

    #[test]
    fn it_selects_sessions_from_the_sidebar() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.start(None, &tx)?;
        load_sessions(&mut app_state, &["a", "b", "c"], &tx, &mut rx)?;

        app_state.handle_event(Event::KeyboardCTRLB(), &tx)?;
        assert!(app_state.sidebar.open);
        assert_eq!(app_state.sidebar.selected, 0);

        app_state.handle_event(Event::UIScrollDown(), &tx)?;
        app_state.handle_event(Event::UIScrollDown(), &tx)?;
        app_state.handle_event(Event::KeyboardEnter(), &tx)?;

        assert!(!app_state.sidebar.open);
        assert_eq!(app_state.chat.current_id(), Some("c"));
        match rx.try_recv()? {
            Action::LoadHistory(_, id) => assert_eq!(id, "c"),
            _ => bail!("Wrong enum"),
        }

        return Ok(());
    }

    #[test]
    fn it_changes_settings() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, _rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());

        app_state.handle_event(Event::KeyboardCTRLS(), &tx)?;
        app_state.handle_event(Event::KeyboardEnter(), &tx)?;

        assert_eq!(app_state.preferences.get().theme, Theme::Dark);
        assert_eq!(app_state.palette, Themes::get(Theme::Dark));

        app_state.handle_event(
            Event::KeyboardCharInput(Input {
                key: Key::Left,
                ctrl: false,
                alt: false,
            }),
            &tx,
        )?;
        assert_eq!(app_state.preferences.get().theme, Theme::Light);

        app_state.handle_event(Event::KeyboardEsc(), &tx)?;
        assert!(!app_state.settings.open);

        return Ok(());
    }

    #[test]
    fn it_rings_bell_on_answers() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());

        submit(&mut app_state, "Question", &tx)?;
        let token = match rx.try_recv()? {
            Action::SendMessage(token, _, _) => token,
            _ => bail!("Wrong enum"),
        };
        let reply = ChatReply {
            session_id: "new".to_string(),
            answer: "Answer".to_string(),
        };
        app_state.handle_event(
            Event::MessageSent(token, None, "Question".to_string(), Ok(reply)),
            &tx,
        )?;

        assert!(app_state.take_bell());
        assert!(!app_state.take_bell());
        assert_eq!(app_state.chat.messages().len(), 1);
        assert!(!app_state.bubble_list.is_empty());

        return Ok(());
    }

    #[test]
    fn it_stays_quiet_for_answers_dropped_by_clear() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());

        submit(&mut app_state, "Question", &tx)?;
        let token = match rx.try_recv()? {
            Action::SendMessage(token, _, _) => token,
            _ => bail!("Wrong enum"),
        };

        submit(&mut app_state, "/clear", &tx)?;
        app_state.handle_event(key('y'), &tx)?;
        rx.try_recv()?;

        let reply = ChatReply {
            session_id: "new".to_string(),
            answer: "Answer".to_string(),
        };
        app_state.handle_event(
            Event::MessageSent(token, None, "Question".to_string(), Ok(reply)),
            &tx,
        )?;

        assert!(!app_state.take_bell());
        assert_eq!(app_state.chat.messages().len(), 0);

        return Ok(());
    }

    #[test]
    fn it_renders_the_opened_session() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.start(None, &tx)?;
        load_sessions(&mut app_state, &["a", "b"], &tx, &mut rx)?;

        open_with_history(&mut app_state, "a", "Visa A question", &tx, &mut rx)?;
        assert!(rendered_bubbles(&app_state)?.contains("Visa A question"));

        open_with_history(&mut app_state, "b", "Green card text", &tx, &mut rx)?;
        let text = rendered_bubbles(&app_state)?;
        assert!(text.contains("Green card text"));
        assert!(!text.contains("Visa A question"));

        return Ok(());
    }

    #[test]
    fn it_stays_quiet_without_notifications() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Action>();
        let mut app_state = app_state(dir.path());
        app_state.preferences.save(UserPreferences {
            notifications: false,
            ..UserPreferences::default()
        })?;

        submit(&mut app_state, "Question", &tx)?;
        let token = match rx.try_recv()? {
            Action::SendMessage(token, _, _) => token,
            _ => bail!("Wrong enum"),
        };
        let reply = ChatReply {
            session_id: "new".to_string(),
            answer: "Answer".to_string(),
        };
        app_state.handle_event(
            Event::MessageSent(token, None, "Question".to_string(), Ok(reply)),
            &tx,
        )?;

        assert!(!app_state.take_bell());
        return Ok(());
    }
}
