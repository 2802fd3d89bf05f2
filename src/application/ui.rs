use std::io;
use std::io::Write;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::List;
use ratatui::widgets::ListItem;
use ratatui::widgets::ListState;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::widgets::Wrap;
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::services::events::EventsService;
use crate::domain::services::help_text;
use crate::domain::services::AppState;
use crate::domain::services::ChatPane;
use crate::domain::services::PreferencesStore;
use crate::infrastructure::storage::StorageManager;

const SIDEBAR_WIDTH: u16 = 32;
const RETRY_HINT: &str = "Press CTRL+R to try again.";

fn welcome_text() -> String {
    let text = r#"
Welcome to AskImmigrate!

Ask anything about US immigration. A few places to start:

- Visa requirements for studying or working in the US
- The green card process and its timelines
- Citizenship and naturalization questions

Type /help to see every command.
        "#;

    return text.trim().to_string();
}

fn centered_rect(percent_x: u16, percent_y: u16, rect: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(rect);

    return Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1];
}

fn overlay_block(app_state: &AppState, title: &str) -> Block<'static> {
    return Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(app_state.palette.border)
        .style(app_state.palette.base)
        .padding(Padding::new(1, 1, 0, 0));
}

fn render_sidebar<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &AppState) {
    let palette = app_state.palette;
    let items = app_state
        .chat
        .sessions()
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut id_style = palette.base;
            if row.current {
                id_style = palette.accent;
            }

            return ListItem::new(vec![
                Line::from(Span::styled(
                    format!("{}. {}", idx + 1, row.display_id),
                    id_style,
                )),
                Line::from(Span::styled(format!("   {}", row.title), palette.muted)),
            ]);
        })
        .collect::<Vec<ListItem>>();

    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(app_state.sidebar.selected));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .title("Sessions")
                .borders(Borders::ALL)
                .border_style(palette.border)
                .style(palette.base),
        )
        .highlight_style(palette.selected);

    frame.render_stateful_widget(list, rect, &mut state);
}

fn render_header<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &AppState) {
    let palette = app_state.palette;
    let mut spans = vec![Span::styled(app_state.chat.current_title(), palette.accent)];
    if let Some(session) = app_state.chat.current_session() {
        spans.push(Span::styled(
            format!(
                "  started {}, last activity {}",
                session.created_at.format("%b %d %H:%M"),
                session.last_activity.format("%H:%M")
            ),
            palette.muted,
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(palette.border)
                .style(palette.base)
                .padding(Padding::new(1, 1, 0, 0)),
        ),
        rect,
    );
}

fn render_centered_text<B: Backend>(frame: &mut Frame<B>, rect: Rect, text: String, style: Style) {
    frame.render_widget(
        Paragraph::new(text)
            .style(style)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(Block::default().padding(Padding::new(2, 2, 1, 0))),
        rect,
    );
}

fn render_pane<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &mut AppState) {
    let palette = app_state.palette;
    match app_state.chat.pane() {
        ChatPane::LoadingSessions => {
            render_centered_text(frame, rect, "Loading sessions...".to_string(), palette.muted);
        }
        ChatPane::LoadingHistory => {
            render_centered_text(
                frame,
                rect,
                "Loading conversation...".to_string(),
                palette.muted,
            );
        }
        ChatPane::BlockingError(err) => {
            render_centered_text(frame, rect, format!("{err}\n\n{RETRY_HINT}"), palette.error);
        }
        ChatPane::Welcome => {
            render_centered_text(frame, rect, welcome_text(), palette.base);
        }
        ChatPane::Thread { banner } => {
            let mut messages_rect = rect;
            if let Some(err) = banner {
                let layout = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints(vec![Constraint::Length(1), Constraint::Min(1)])
                    .split(rect);
                frame.render_widget(
                    Paragraph::new(format!("{err}. {RETRY_HINT}")).style(palette.error),
                    layout[0],
                );
                messages_rect = layout[1];
            }

            if messages_rect.width != app_state.last_known_width
                || messages_rect.height != app_state.last_known_height
            {
                app_state.set_rect(messages_rect);
            }

            app_state
                .bubble_list
                .render(frame, messages_rect, app_state.scroll.position);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                messages_rect.inner(&Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut app_state.scroll.scrollbar_state,
            );
        }
    }
}

fn render_settings<B: Backend>(frame: &mut Frame<B>, app_state: &AppState) {
    let palette = app_state.palette;
    let rows = app_state.settings.rows(app_state.preferences.get());
    let selected = app_state.settings.selected();
    let items = rows
        .into_iter()
        .map(|(field, value)| {
            if value.is_empty() {
                return ListItem::new(field.label());
            }
            return ListItem::new(format!("{:<16}{value}", field.label()));
        })
        .collect::<Vec<ListItem>>();

    let mut state = ListState::default();
    state.select(
        app_state
            .settings
            .rows(app_state.preferences.get())
            .iter()
            .position(|(field, _)| return *field == selected),
    );

    let rect = centered_rect(50, 50, frame.size());
    frame.render_widget(Clear, rect);
    frame.render_stateful_widget(
        List::new(items)
            .block(overlay_block(
                app_state,
                "Settings (Left/Right change, Enter select, Esc close)",
            ))
            .highlight_style(palette.selected),
        rect,
        &mut state,
    );
}

fn render_help<B: Backend>(frame: &mut Frame<B>, app_state: &AppState) {
    let rect = centered_rect(80, 80, frame.size());
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(help_text())
            .wrap(Wrap { trim: false })
            .block(overlay_block(app_state, "Help (Esc to close)")),
        rect,
    );
}

fn render_confirm_clear<B: Backend>(frame: &mut Frame<B>, app_state: &AppState) {
    let rect = centered_rect(50, 25, frame.size());
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(
            "This removes your preferences and all locally stored data.\n\nContinue? (y/n)",
        )
        .wrap(Wrap { trim: false })
        .block(overlay_block(app_state, "Clear all data")),
        rect,
    );
}

fn render<B: Backend>(frame: &mut Frame<B>, app_state: &mut AppState) {
    let mut main_rect = frame.size();
    if app_state.sidebar.open {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
            .split(frame.size());
        render_sidebar(frame, layout[0], app_state);
        main_rect = layout[1];
    }

    let notice_height = if app_state.notice.is_some() { 1 } else { 0 };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(notice_height),
            Constraint::Max(4),
        ])
        .split(main_rect);

    render_header(frame, layout[0], app_state);
    render_pane(frame, layout[1], app_state);

    if let Some(notice) = &app_state.notice {
        frame.render_widget(
            Paragraph::new(notice.to_string()).style(app_state.palette.muted),
            layout[2],
        );
    }

    if app_state.chat.is_sending() {
        app_state
            .loading
            .render(frame, layout[3], app_state.palette.border);
    } else {
        frame.render_widget(app_state.textarea.widget(), layout[3]);
    }

    if app_state.settings.open {
        render_settings(frame, app_state);
    }
    if app_state.help_open {
        render_help(frame, app_state);
    }
    if app_state.confirm_clear {
        render_confirm_clear(frame, app_state);
    }
}

async fn start_loop<B: Backend + Write>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState<'_>,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut events = EventsService::new(rx);
    app_state.start(non_empty(Config::get(ConfigKey::SessionID)), &tx)?;

    loop {
        terminal.draw(|frame| {
            render(frame, app_state);
        })?;

        if app_state.take_bell() {
            terminal.backend_mut().write_all(b"\x07")?;
            io::Write::flush(terminal.backend_mut())?;
        }

        let event = events.next().await?;
        if app_state.handle_event(event, &tx)? {
            break;
        }
    }

    return Ok(());
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        return None;
    }
    return Some(value);
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let preferences = PreferencesStore::load(StorageManager::get()?);
    let mut app_state = AppState::new(preferences, Config::get(ConfigKey::DataDir).into());

    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    start_loop(&mut terminal, &mut app_state, tx, rx).await?;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return Ok(());
}
