//! Command dispatch.

pub mod auth;
pub mod config;
pub mod extract;
pub mod tasks;
pub mod tui;

use crate::cli::{Cli, Command};
use anyhow::Result;

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Tui => tui::handle().await,
        Command::Config { action } => config::handle(action).await,
        Command::Auth { action } => auth::handle(action).await,
        Command::List { status, category } => tasks::list(&status, category.as_deref()).await,
        Command::Add {
            title,
            category,
            priority,
            due,
        } => tasks::add(&title, category.as_deref(), priority.as_deref(), due.as_deref()).await,
        Command::Toggle { id } => tasks::toggle(&id).await,
        Command::Edit {
            id,
            title,
            category,
            priority,
            due,
            clear_due,
        } => {
            tasks::edit(
                &id,
                title.as_deref(),
                category.as_deref(),
                priority.as_deref(),
                due.as_deref(),
                clear_due,
            )
            .await
        }
        Command::Rm { id } => tasks::rm(&id).await,
        Command::Extract {
            mode,
            file,
            local,
            apply,
        } => extract::handle(&mode, file.as_deref(), local, apply).await,
    }
}
