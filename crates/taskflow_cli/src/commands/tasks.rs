//! Task CRUD subcommands: `list`, `add`, `toggle`, `edit`, `rm`.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use comfy_table::{Cell, Color};
use taskflow_api::TaskApi;
use taskflow_auth::{SessionStore, SessionTokenProvider, UserPoolClient, UserPoolConfig};
use taskflow_core::{
    AppConfig, Counts, Filter, Priority, StatusFilter, Task, TaskDraft, TaskPatch,
};

use crate::output;

/// Task client wired to the cached session. Stale tokens refresh
/// transparently through the token provider.
pub(crate) fn task_api() -> Result<TaskApi> {
    let config = AppConfig::load()?;
    let pool =
        UserPoolConfig::from_app_config(&config).map_err(|err| anyhow!(err.friendly_message()))?;
    let client = UserPoolClient::new(pool);
    let store = SessionStore::open_default().map_err(|err| anyhow!(err.friendly_message()))?;
    let tokens = Arc::new(SessionTokenProvider::new(client, store));
    Ok(TaskApi::from_app_config(&config, tokens)?)
}

fn parse_due(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid due date {raw:?}, expected YYYY-MM-DD"))
}

/// Cells for one task row: done mark, title, category, priority, due, id.
fn task_cells(task: &Task, today: NaiveDate) -> Vec<Cell> {
    let mark = if task.completed {
        Cell::new("x").fg(Color::Green)
    } else {
        Cell::new("")
    };
    let title = if task.completed {
        Cell::new(&task.title)
            .fg(Color::DarkGrey)
            .add_attribute(comfy_table::Attribute::CrossedOut)
    } else {
        Cell::new(&task.title)
    };
    let priority = match task.priority {
        Priority::Urgent => Cell::new("urgent")
            .fg(Color::Red)
            .add_attribute(comfy_table::Attribute::Bold),
        Priority::High => Cell::new("high").fg(Color::Yellow),
        Priority::Medium => Cell::new("medium").fg(Color::Cyan),
        Priority::Low => Cell::new("low").fg(Color::DarkGrey),
    };
    let due = match task.due_date {
        Some(date) if task.is_overdue(today) => Cell::new(date.to_string()).fg(Color::Red),
        Some(date) => Cell::new(date.to_string()),
        None => Cell::new(""),
    };
    vec![
        mark,
        title,
        Cell::new(task.category.as_str()),
        priority,
        due,
        Cell::new(&task.id).fg(Color::DarkGrey),
    ]
}

pub async fn list(status: &str, category: Option<&str>) -> Result<()> {
    let status: StatusFilter = status.parse()?;
    let mut filter = Filter::new().with_status(status);
    if let Some(raw) = category {
        filter = filter.with_category(raw.parse()?);
    }

    let api = task_api()?;
    let spin = output::spinner("Loading tasks...");
    let result = api.list_todos().await;
    spin.finish_and_clear();
    let tasks = result?;

    let counts = Counts::tally(&tasks);
    let visible: Vec<&Task> = tasks.iter().filter(|task| filter.matches(task)).collect();

    if output::is_json() {
        output::data(
            "tasks",
            &serde_json::json!({ "tasks": visible, "counts": counts }),
        );
        return Ok(());
    }

    if visible.is_empty() {
        if counts.total == 0 {
            output::dim("No tasks yet. Add one with: taskflow add \"Buy milk\"");
        } else {
            output::dim("Nothing matches this filter.");
        }
        return Ok(());
    }

    let today = Local::now().date_naive();
    let mut table = output::table();
    output::table_header(&mut table, &["", "Title", "Category", "Priority", "Due", "Id"]);
    for task in &visible {
        table.add_row(task_cells(task, today));
    }
    output::table_print(&table);
    output::dim(&format!(
        "{} active · {} completed · {} total",
        counts.active, counts.completed, counts.total
    ));
    Ok(())
}

pub async fn add(
    title: &str,
    category: Option<&str>,
    priority: Option<&str>,
    due: Option<&str>,
) -> Result<()> {
    let mut draft = TaskDraft::new(title);
    if let Some(raw) = category {
        draft = draft.with_category(raw.parse()?);
    }
    if let Some(raw) = priority {
        draft = draft.with_priority(raw.parse()?);
    }
    if let Some(raw) = due {
        draft = draft.with_due_date(parse_due(raw)?);
    }

    let api = task_api()?;
    let spin = output::spinner("Adding task...");
    match api.create_todo(&draft).await {
        Ok(task) => {
            if output::is_json() {
                spin.finish_and_clear();
                output::data("task", &task);
            } else {
                output::spinner_success(&spin, &format!("Added \"{}\"", task.title));
                output::dim(&format!("  id {}", task.id));
            }
            Ok(())
        }
        Err(err) => {
            output::spinner_error(&spin, "Could not add the task");
            Err(anyhow!("Create failed: {err}"))
        }
    }
}

pub async fn toggle(id: &str) -> Result<()> {
    let api = task_api()?;
    let spin = output::spinner("Loading tasks...");
    let result = api.list_todos().await;
    spin.finish_and_clear();
    let tasks = result?;

    let task = tasks
        .iter()
        .find(|task| task.id == id)
        .ok_or_else(|| anyhow!("No task with id {id}"))?;

    let updated = api.toggle_todo(id, !task.completed).await?;
    let state = if updated.completed { "done" } else { "active" };
    if output::is_json() {
        output::data("task", &updated);
    } else {
        output::success(&format!("Marked \"{}\" {}", updated.title, state));
    }
    Ok(())
}

pub async fn edit(
    id: &str,
    title: Option<&str>,
    category: Option<&str>,
    priority: Option<&str>,
    due: Option<&str>,
    clear_due: bool,
) -> Result<()> {
    let mut patch = TaskPatch::new();
    if let Some(title) = title {
        patch = patch.with_title(title);
    }
    if let Some(raw) = category {
        patch = patch.with_category(raw.parse()?);
    }
    if let Some(raw) = priority {
        patch = patch.with_priority(raw.parse()?);
    }
    if let Some(raw) = due {
        patch = patch.with_due_date(parse_due(raw)?);
    }
    if clear_due {
        patch = patch.clear_due_date();
    }
    if patch.is_empty() {
        return Err(anyhow!(
            "Nothing to change; pass at least one of --title, --category, --priority, --due, --clear-due"
        ));
    }

    let api = task_api()?;
    let updated = api.update_todo(id, &patch).await?;
    if output::is_json() {
        output::data("task", &updated);
    } else {
        output::success(&format!("Updated \"{}\"", updated.title));
    }
    Ok(())
}

pub async fn rm(id: &str) -> Result<()> {
    let api = task_api()?;
    api.delete_todo(id).await?;
    output::success(&format!("Deleted {id}"));
    Ok(())
}
