//! TUI run loop: terminal setup, key handling, draw.
//!
//! Key events are read in a dedicated thread so the main loop never blocks
//! on terminal input. Network work happens in a worker task the caller
//! spawns; the loop only exchanges [NetCommand]/[AppEvent] messages with it,
//! so drawing stays responsive while requests are in flight.

use std::io;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc as tokio_mpsc;

use taskflow_auth::{AuthMode, FlowMessage};
use taskflow_core::TaskDraft;

use crate::events::{self, AppEvent, NetCommand};
use crate::state::{ExtractFocus, Screen, TuiState};
use crate::view;

/// Run the TUI against a worker wired up on the given channels. Blocks the
/// calling thread until the user quits.
pub fn run_app(
    mut event_rx: tokio_mpsc::Receiver<AppEvent>,
    cmd_tx: tokio_mpsc::Sender<NetCommand>,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = TuiState::new();
    send(&cmd_tx, &mut state, NetCommand::CheckSession, Some("Checking session"));
    let result = run_loop(&mut terminal, &mut state, &mut event_rx, &cmd_tx);

    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    disable_raw_mode()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut TuiState,
    event_rx: &mut tokio_mpsc::Receiver<AppEvent>,
    cmd_tx: &tokio_mpsc::Sender<NetCommand>,
) -> anyhow::Result<()> {
    let (key_tx, key_rx) = mpsc::channel();
    let _reader = std::thread::spawn(move || {
        loop {
            if event::poll(Duration::from_millis(50)).unwrap_or(false)
                && let Ok(ev) = event::read()
            {
                let _ = key_tx.send(ev);
            }
        }
    });

    loop {
        // Drain worker replies; a reply may queue a follow-up command.
        while let Ok(app_event) = event_rx.try_recv() {
            if let Some(follow_up) = events::apply(state, app_event) {
                send(cmd_tx, state, follow_up, None);
            }
        }

        state.tick_status();

        if state.needs_redraw {
            terminal.draw(|f| view::draw(f, state))?;
            state.needs_redraw = false;
        }

        if let Ok(ev) = key_rx.try_recv() {
            match ev {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key(state, key, cmd_tx) {
                        break;
                    }
                }
                Event::Resize(_, _) => state.needs_redraw = true,
                _ => {}
            }
        } else {
            std::thread::sleep(Duration::from_millis(50));
        }
    }
    Ok(())
}

/// Queue a command for the worker, optionally flagging the UI as busy.
fn send(
    cmd_tx: &tokio_mpsc::Sender<NetCommand>,
    state: &mut TuiState,
    cmd: NetCommand,
    busy: Option<&str>,
) {
    if let Some(label) = busy {
        state.busy = Some(label.to_string());
    }
    if cmd_tx.try_send(cmd).is_err() {
        state.busy = None;
        state.set_status("Background worker is gone; restart the app");
    }
    state.needs_redraw = true;
}

/// Handle one key press. Returns true to quit.
fn handle_key(
    state: &mut TuiState,
    key: KeyEvent,
    cmd_tx: &tokio_mpsc::Sender<NetCommand>,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    state.needs_redraw = true;
    match state.screen {
        Screen::Auth => auth_key(state, key, cmd_tx),
        Screen::Board => return board_key(state, key, cmd_tx),
        Screen::QuickAdd => quick_add_key(state, key, cmd_tx),
        Screen::Extract => extract_key(state, key, cmd_tx),
    }
    false
}

fn auth_key(state: &mut TuiState, key: KeyEvent, cmd_tx: &tokio_mpsc::Sender<NetCommand>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Tab => state.auth.focus_next(),
        KeyCode::BackTab => state.auth.focus_prev(),
        KeyCode::Char('r') if ctrl && state.auth.mode == AuthMode::Verify => {
            send(cmd_tx, state, NetCommand::ResendCode, Some("Sending code"));
        }
        KeyCode::Char('u') if ctrl => {
            let next = match state.auth.mode {
                AuthMode::SignIn => AuthMode::SignUp,
                _ => AuthMode::SignIn,
            };
            send(cmd_tx, state, NetCommand::SwitchAuthMode(next), None);
        }
        KeyCode::Enter => submit_auth(state, cmd_tx),
        KeyCode::Backspace => state.auth.backspace(),
        KeyCode::Char(c) if !ctrl => state.auth.insert(c),
        _ => {}
    }
}

fn submit_auth(state: &mut TuiState, cmd_tx: &tokio_mpsc::Sender<NetCommand>) {
    match state.auth.mode {
        AuthMode::SignIn | AuthMode::SignUp => {
            let email = state.auth.email.trim().to_string();
            let password = state.auth.password.clone();
            if email.is_empty() || password.is_empty() {
                state.auth.message =
                    Some(FlowMessage::error("Email and password are required"));
                return;
            }
            if state.auth.mode == AuthMode::SignIn {
                send(
                    cmd_tx,
                    state,
                    NetCommand::SignIn { email, password },
                    Some("Signing in"),
                );
            } else {
                send(
                    cmd_tx,
                    state,
                    NetCommand::SignUp { email, password },
                    Some("Creating account"),
                );
            }
        }
        AuthMode::Verify => {
            let code = state.auth.code.trim().to_string();
            if code.is_empty() {
                state.auth.message = Some(FlowMessage::error("Enter the emailed code"));
                return;
            }
            send(cmd_tx, state, NetCommand::Verify { code }, Some("Verifying"));
        }
        AuthMode::NewPassword => {
            let password = state.auth.new_password.clone();
            if password.is_empty() {
                state.auth.message = Some(FlowMessage::error("Enter a new password"));
                return;
            }
            send(
                cmd_tx,
                state,
                NetCommand::NewPassword { password },
                Some("Updating password"),
            );
        }
    }
}

/// Board keys. Returns true to quit.
fn board_key(
    state: &mut TuiState,
    key: KeyEvent,
    cmd_tx: &tokio_mpsc::Sender<NetCommand>,
) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Up | KeyCode::Char('k') => state.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => state.select_next(),
        KeyCode::Char(' ') => {
            if let Some((id, completed)) =
                state.selected_task().map(|t| (t.id.clone(), !t.completed))
            {
                send(
                    cmd_tx,
                    state,
                    NetCommand::ToggleTask { id, completed },
                    Some("Updating"),
                );
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = state.selected_task().map(|t| t.id.clone()) {
                send(cmd_tx, state, NetCommand::DeleteTask { id }, Some("Deleting"));
            }
        }
        KeyCode::Char('a') => {
            state.add.reset();
            state.screen = Screen::QuickAdd;
        }
        KeyCode::Char('x') => state.screen = Screen::Extract,
        KeyCode::Tab => state.cycle_status_filter(),
        KeyCode::Char('c') => state.cycle_category_filter(),
        KeyCode::Char('r') => send(cmd_tx, state, NetCommand::LoadTasks, Some("Loading")),
        _ => {}
    }
    false
}

fn quick_add_key(state: &mut TuiState, key: KeyEvent, cmd_tx: &tokio_mpsc::Sender<NetCommand>) {
    match key.code {
        KeyCode::Esc => state.screen = Screen::Board,
        KeyCode::Tab => state.add.focus_next(),
        KeyCode::BackTab => state.add.focus_prev(),
        KeyCode::Left => state.add.cycle(false),
        KeyCode::Right => state.add.cycle(true),
        KeyCode::Enter => match state.add.draft() {
            Ok(draft) => send(
                cmd_tx,
                state,
                NetCommand::CreateTask {
                    draft,
                    preview_id: None,
                },
                Some("Adding"),
            ),
            Err(msg) => state.set_status(msg),
        },
        KeyCode::Backspace => state.add.backspace(),
        KeyCode::Char(c) => state.add.insert(c),
        _ => {}
    }
}

fn extract_key(state: &mut TuiState, key: KeyEvent, cmd_tx: &tokio_mpsc::Sender<NetCommand>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match state.extract.focus {
        ExtractFocus::Input => match key.code {
            KeyCode::Esc => state.screen = Screen::Board,
            KeyCode::Tab if !state.extract.results.is_empty() => {
                state.extract.focus = ExtractFocus::Results;
            }
            KeyCode::Left => state.extract.cycle_mode(false),
            KeyCode::Right => state.extract.cycle_mode(true),
            KeyCode::Char('e') if ctrl => run_extract(state, cmd_tx),
            KeyCode::Enter => state.extract.text.push('\n'),
            KeyCode::Backspace => {
                state.extract.text.pop();
            }
            KeyCode::Char(c) if !ctrl => state.extract.text.push(c),
            _ => {}
        },
        ExtractFocus::Results => match key.code {
            KeyCode::Esc | KeyCode::Tab => state.extract.focus = ExtractFocus::Input,
            KeyCode::Up | KeyCode::Char('k') => state.extract.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => state.extract.select_next(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some((draft, preview_id)) = state
                    .extract
                    .selected_task()
                    .map(|t| (TaskDraft::from(t), t.id.clone()))
                {
                    send(
                        cmd_tx,
                        state,
                        NetCommand::CreateTask {
                            draft,
                            preview_id: Some(preview_id),
                        },
                        Some("Adding"),
                    );
                }
            }
            KeyCode::Char('a') => {
                let items = state.extract.drafts();
                if !items.is_empty() {
                    send(cmd_tx, state, NetCommand::AddAll { items }, Some("Adding all"));
                }
            }
            _ => {}
        },
    }
}

fn run_extract(state: &mut TuiState, cmd_tx: &tokio_mpsc::Sender<NetCommand>) {
    if state.extract.running {
        return;
    }
    let text = state.extract.text.clone();
    if text.trim().is_empty() {
        state.set_status("Nothing to extract");
        return;
    }
    let mode = state.extract.mode;
    state.extract.running = true;
    send(cmd_tx, state, NetCommand::Extract { text, mode }, Some("Extracting"));
}
