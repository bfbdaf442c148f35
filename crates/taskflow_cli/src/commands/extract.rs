//! `taskflow extract`: pull tasks out of free-form text.

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, Result};
use chrono::Local;
use comfy_table::Cell;
use taskflow_api::{Engine, Extraction};
use taskflow_core::TaskDraft;
use taskflow_extract::ExtractMode;

use crate::commands::tasks::task_api;
use crate::output;

pub async fn handle(mode: &str, file: Option<&Path>, local: bool, apply: bool) -> Result<()> {
    let mode: ExtractMode = mode.parse()?;
    let text = read_text(file)?;
    if text.trim().is_empty() {
        return Err(anyhow!(
            "No text to extract; pass --file or pipe text on stdin"
        ));
    }
    let today = Local::now().date_naive();

    // Preview-only local runs never need credentials or config.
    if local && !apply {
        let started = Instant::now();
        let extraction = Extraction {
            tasks: taskflow_extract::extract(&text, mode, today),
            engine: Engine::Local,
        };
        let elapsed_ms = started.elapsed().as_millis();
        report(&extraction, mode, elapsed_ms);
        if !extraction.tasks.is_empty() && !output::is_json() {
            output::dim("Re-run with --apply to add these to the board.");
        }
        return Ok(());
    }

    let api = task_api()?;
    let started = Instant::now();
    let extraction = if local {
        Extraction {
            tasks: taskflow_extract::extract(&text, mode, today),
            engine: Engine::Local,
        }
    } else {
        let spin = output::spinner("Extracting tasks...");
        let extraction = api.extract_todos(&text, mode, today).await;
        spin.finish_and_clear();
        extraction
    };
    let elapsed_ms = started.elapsed().as_millis();

    report(&extraction, mode, elapsed_ms);

    if extraction.tasks.is_empty() {
        return Ok(());
    }

    if !apply {
        if !output::is_json() {
            output::dim("Re-run with --apply to add these to the board.");
        }
        return Ok(());
    }

    let drafts: Vec<TaskDraft> = extraction.tasks.iter().map(TaskDraft::from).collect();
    let results = api.create_many(&drafts).await;

    let mut added = 0usize;
    let mut failed = 0usize;
    for (draft, result) in drafts.iter().zip(&results) {
        if let Err(err) = result {
            failed += 1;
            output::warning(&format!("Could not add \"{}\": {}", draft.title, err));
        } else {
            added += 1;
        }
    }

    if output::is_json() {
        output::data(
            "applied",
            &serde_json::json!({ "added": added, "failed": failed }),
        );
    } else if failed == 0 {
        output::success(&format!("Added {added} tasks"));
    } else {
        output::warning(&format!("Added {added} tasks, {failed} failed"));
    }
    Ok(())
}

fn read_text(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn report(extraction: &Extraction, mode: ExtractMode, elapsed_ms: u128) {
    if output::is_json() {
        output::data(
            "extraction",
            &serde_json::json!({
                "tasks": extraction.tasks,
                "engine": extraction.engine.as_str(),
                "mode": mode.as_str(),
                "elapsedMs": elapsed_ms as u64,
            }),
        );
        return;
    }

    if extraction.tasks.is_empty() {
        output::warning("No tasks found in that text");
        return;
    }

    let mut table = output::table();
    output::table_header(&mut table, &["Title", "Category", "Priority", "Due"]);
    for task in &extraction.tasks {
        table.add_row(vec![
            Cell::new(&task.title),
            Cell::new(task.category.as_str()),
            Cell::new(task.priority.as_str()),
            Cell::new(task.due_date.map(|d| d.to_string()).unwrap_or_default()),
        ]);
    }
    output::table_print(&table);
    output::dim(&format!(
        "{} tasks · {} engine · {} mode · {} ms",
        extraction.tasks.len(),
        extraction.engine,
        mode,
        elapsed_ms
    ));
}
