//! Messages exchanged with the network worker, and how replies mutate
//! [TuiState].
//!
//! The UI loop never touches the network. It sends [NetCommand]s to a worker
//! task and folds the resulting [AppEvent]s into state via [apply]. The store
//! only changes on success replies, so a failed call leaves the board exactly
//! as the server last reported it.

use taskflow_api::{ApiError, Engine};
use taskflow_auth::{AuthMode, FlowMessage};
use taskflow_core::{Task, TaskDraft};
use taskflow_extract::ExtractMode;

use crate::state::{Screen, TuiState};

/// Requests the UI sends to the network worker.
#[derive(Debug, Clone, PartialEq)]
pub enum NetCommand {
    /// Restore a cached session, refreshing if stale.
    CheckSession,
    SwitchAuthMode(AuthMode),
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    Verify { code: String },
    ResendCode,
    NewPassword { password: String },
    LoadTasks,
    /// `preview_id` ties the reply back to an extract preview entry.
    CreateTask {
        draft: TaskDraft,
        preview_id: Option<String>,
    },
    ToggleTask { id: String, completed: bool },
    DeleteTask { id: String },
    Extract { text: String, mode: ExtractMode },
    /// Bulk add of extract previews, (preview id, draft) per entry.
    AddAll { items: Vec<(String, TaskDraft)> },
}

/// Auth screen state as the worker's flow sees it after a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSnapshot {
    pub mode: AuthMode,
    pub message: Option<FlowMessage>,
}

/// Replies the worker sends back to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// A valid session exists; the board can load.
    SessionReady { username: String },
    /// No cached session; show the auth screen.
    NoSession,
    /// Auth flow advanced without completing sign-in.
    Auth(AuthSnapshot),
    TasksLoaded(Result<Vec<Task>, ApiError>),
    TaskCreated {
        result: Result<Task, ApiError>,
        preview_id: Option<String>,
    },
    TaskUpdated(Result<Task, ApiError>),
    TaskDeleted {
        id: String,
        result: Result<(), ApiError>,
    },
    Extracted {
        tasks: Vec<Task>,
        engine: Engine,
        elapsed_ms: u64,
    },
    BulkAdded {
        added: Vec<Task>,
        failed_ids: Vec<String>,
    },
}

/// Fold a worker reply into state. Returns a follow-up command when the
/// reply calls for one (e.g. a restored session triggers the first load).
pub fn apply(state: &mut TuiState, event: AppEvent) -> Option<NetCommand> {
    state.needs_redraw = true;
    state.busy = None;
    match event {
        AppEvent::SessionReady { username } => {
            state.screen = Screen::Board;
            state.set_status(format!("Signed in as {username}"));
            state.username = Some(username);
            Some(NetCommand::LoadTasks)
        }
        AppEvent::NoSession => {
            state.screen = Screen::Auth;
            state.username = None;
            None
        }
        AppEvent::Auth(snapshot) => {
            state.screen = Screen::Auth;
            state.auth.set_mode(snapshot.mode);
            state.auth.message = snapshot.message;
            None
        }
        AppEvent::TasksLoaded(Ok(tasks)) => {
            let counts = taskflow_core::Counts::tally(&tasks);
            state.tasks.replace_all(tasks);
            state.clamp_selection();
            state.set_status(format!("{} tasks loaded", counts.total));
            None
        }
        AppEvent::TasksLoaded(Err(err)) => {
            state.set_status(format!("Load failed: {err}"));
            None
        }
        AppEvent::TaskCreated {
            result: Ok(task),
            preview_id,
        } => {
            state.set_status(format!("Added \"{}\"", task.title));
            match preview_id {
                // Extract preview entry: clear it from the panel.
                Some(id) => state.extract.remove(&id),
                // Quick-add: close the form and return to the board.
                None => {
                    if state.screen == Screen::QuickAdd {
                        state.add.reset();
                        state.screen = Screen::Board;
                    }
                }
            }
            state.tasks.push(task);
            state.clamp_selection();
            None
        }
        AppEvent::TaskCreated {
            result: Err(err), ..
        } => {
            state.set_status(format!("Add failed: {err}"));
            None
        }
        AppEvent::TaskUpdated(Ok(task)) => {
            state.tasks.upsert(task);
            None
        }
        AppEvent::TaskUpdated(Err(err)) => {
            state.set_status(format!("Update failed: {err}"));
            None
        }
        AppEvent::TaskDeleted { id, result: Ok(()) } => {
            state.tasks.remove(&id);
            state.clamp_selection();
            state.set_status("Task deleted");
            None
        }
        AppEvent::TaskDeleted {
            result: Err(err), ..
        } => {
            state.set_status(format!("Delete failed: {err}"));
            None
        }
        AppEvent::Extracted {
            tasks,
            engine,
            elapsed_ms,
        } => {
            let count = tasks.len();
            state.extract.set_results(tasks, engine, elapsed_ms);
            if count == 0 {
                state.set_status("No tasks found in that text");
            }
            None
        }
        AppEvent::BulkAdded { added, failed_ids } => {
            let added_count = added.len();
            state.tasks.extend(added);
            state.extract.retain_only(&failed_ids);
            state.clamp_selection();
            if failed_ids.is_empty() {
                state.extract.text.clear();
                state.screen = Screen::Board;
                state.set_status(format!("Added {added_count} tasks"));
            } else {
                state.set_status(format!(
                    "Added {added_count}, {} failed (kept in preview)",
                    failed_ids.len()
                ));
            }
            None
        }
    }
}
