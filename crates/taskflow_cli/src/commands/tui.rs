//! `taskflow tui`: the interactive board plus its network worker task.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use chrono::Local;
use tokio::sync::mpsc;

use taskflow_api::TaskApi;
use taskflow_auth::{
    AuthFlow, AuthSession, AuthTokens, FlowMessage, SessionStore, SessionTokenProvider,
    UserPoolClient, UserPoolConfig,
};
use taskflow_core::{AppConfig, TaskDraft};
use taskflow_tui::{run_app, AppEvent, AuthSnapshot, NetCommand};

pub async fn handle() -> Result<()> {
    let config = AppConfig::load()?;
    let pool =
        UserPoolConfig::from_app_config(&config).map_err(|err| anyhow!(err.friendly_message()))?;
    let client = UserPoolClient::new(pool);
    let store = SessionStore::open_default().map_err(|err| anyhow!(err.friendly_message()))?;
    let tokens = Arc::new(SessionTokenProvider::new(client.clone(), store.clone()));
    let api = TaskApi::from_app_config(&config, tokens)?;

    let (event_tx, event_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);

    tokio::spawn(run_worker(client, store, api, cmd_rx, event_tx));

    run_app(event_rx, cmd_tx)?;
    Ok(())
}

/// Translate UI commands into service calls, one reply per command. The loop
/// ends when the UI drops its channel ends.
async fn run_worker(
    client: UserPoolClient,
    store: SessionStore,
    api: TaskApi,
    mut cmd_rx: mpsc::Receiver<NetCommand>,
    event_tx: mpsc::Sender<AppEvent>,
) {
    let mut flow = AuthFlow::new();

    while let Some(cmd) = cmd_rx.recv().await {
        let event = match cmd {
            NetCommand::CheckSession => match store.current_session(&client).await {
                Ok(session) => AppEvent::SessionReady {
                    username: session.username,
                },
                Err(err) => {
                    tracing::debug!(error = %err, "no usable cached session");
                    AppEvent::NoSession
                }
            },
            NetCommand::SwitchAuthMode(mode) => {
                flow.switch_to(mode);
                snapshot(&flow)
            }
            NetCommand::SignIn { email, password } => {
                match flow.submit_sign_in(&client, &email, &password).await {
                    Some(tokens) => session_ready(&store, &email, tokens, &flow),
                    None => snapshot(&flow),
                }
            }
            NetCommand::SignUp { email, password } => {
                match flow.submit_sign_up(&client, &email, &password).await {
                    Some(tokens) => session_ready(&store, &email, tokens, &flow),
                    None => snapshot(&flow),
                }
            }
            NetCommand::Verify { code } => {
                let username = flow.pending_username().unwrap_or_default().to_string();
                match flow.submit_verify(&client, &code).await {
                    Some(tokens) => session_ready(&store, &username, tokens, &flow),
                    None => snapshot(&flow),
                }
            }
            NetCommand::ResendCode => {
                flow.submit_resend(&client).await;
                snapshot(&flow)
            }
            NetCommand::NewPassword { password } => {
                let username = flow.pending_username().unwrap_or_default().to_string();
                match flow.submit_new_password(&client, &password).await {
                    Some(tokens) => session_ready(&store, &username, tokens, &flow),
                    None => snapshot(&flow),
                }
            }
            NetCommand::LoadTasks => AppEvent::TasksLoaded(api.list_todos().await),
            NetCommand::CreateTask { draft, preview_id } => AppEvent::TaskCreated {
                result: api.create_todo(&draft).await,
                preview_id,
            },
            NetCommand::ToggleTask { id, completed } => {
                AppEvent::TaskUpdated(api.toggle_todo(&id, completed).await)
            }
            NetCommand::DeleteTask { id } => {
                let result = api.delete_todo(&id).await;
                AppEvent::TaskDeleted { id, result }
            }
            NetCommand::Extract { text, mode } => {
                let started = Instant::now();
                let today = Local::now().date_naive();
                let extraction = api.extract_todos(&text, mode, today).await;
                AppEvent::Extracted {
                    tasks: extraction.tasks,
                    engine: extraction.engine,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                }
            }
            NetCommand::AddAll { items } => {
                let drafts: Vec<TaskDraft> =
                    items.iter().map(|(_, draft)| draft.clone()).collect();
                let results = api.create_many(&drafts).await;
                let mut added = Vec::new();
                let mut failed_ids = Vec::new();
                for ((preview_id, draft), result) in items.into_iter().zip(results) {
                    match result {
                        Ok(task) => added.push(task),
                        Err(err) => {
                            tracing::warn!(title = %draft.title, error = %err, "bulk add entry failed");
                            failed_ids.push(preview_id);
                        }
                    }
                }
                AppEvent::BulkAdded { added, failed_ids }
            }
        };

        if event_tx.send(event).await.is_err() {
            break;
        }
    }
}

fn snapshot(flow: &AuthFlow) -> AppEvent {
    AppEvent::Auth(AuthSnapshot {
        mode: flow.mode(),
        message: flow.message().cloned(),
    })
}

/// Persist fresh tokens and hand the UI a ready session. A failed save shows
/// up on the auth screen instead of silently dropping the sign-in.
fn session_ready(
    store: &SessionStore,
    username: &str,
    tokens: AuthTokens,
    flow: &AuthFlow,
) -> AppEvent {
    let session = AuthSession::from_tokens(username, tokens);
    if let Err(err) = store.save(&session) {
        return AppEvent::Auth(AuthSnapshot {
            mode: flow.mode(),
            message: Some(FlowMessage::error(format!("Could not save session: {err}"))),
        });
    }
    AppEvent::SessionReady {
        username: session.username,
    }
}
