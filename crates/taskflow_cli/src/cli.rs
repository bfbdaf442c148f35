//! CLI argument definitions using clap derive macros.

use clap::{Parser, Subcommand, ValueEnum};

/// Task board in your terminal, backed by a hosted to-do service
#[derive(Parser)]
#[command(name = "taskflow", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// Structured JSON for scripts and machine consumption
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Open the interactive task board
    Tui,
    /// Inspect the deployment configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Sign up, sign in, and manage the cached session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// List tasks
    List {
        /// Status filter: all, active, or completed
        #[arg(short, long, default_value = "all")]
        status: String,
        /// Only show tasks in this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Category (work, personal, shopping, health, finance, learning, other)
        #[arg(short, long)]
        category: Option<String>,
        /// Priority (low, medium, high, urgent)
        #[arg(short, long)]
        priority: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
    },
    /// Toggle a task between active and completed
    Toggle {
        /// Task id
        id: String,
    },
    /// Edit a task's fields
    Edit {
        /// Task id
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<String>,
        /// New due date (YYYY-MM-DD)
        #[arg(short, long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Delete a task
    Rm {
        /// Task id
        id: String,
    },
    /// Extract tasks from free-form text
    Extract {
        /// Extraction mode: general, email, or notes
        #[arg(short, long, default_value = "general")]
        mode: String,
        /// Read text from this file instead of stdin
        #[arg(short, long)]
        file: Option<std::path::PathBuf>,
        /// Skip the remote extractor and use the built-in one
        #[arg(long)]
        local: bool,
        /// Add the extracted tasks to the board
        #[arg(long)]
        apply: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the active configuration values
    Show,
    /// Show which config files were found
    Path,
    /// Verify the configuration points at a provisioned deployment
    Check,
}

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account
    SignUp {
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Confirm an account with the emailed code
    Verify {
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Verification code from the email
        #[arg(short, long)]
        code: String,
    },
    /// Resend the verification code
    Resend {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Sign in and cache the session
    SignIn {
        /// Email address
        #[arg(short, long)]
        email: String,
        /// Password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Answer a new-password challenge from a previous sign-in
    NewPassword {
        /// Email address
        #[arg(short, long)]
        email: String,
        /// New password (prompted if omitted)
        #[arg(short, long)]
        password: Option<String>,
        /// Challenge session from the sign-in attempt
        #[arg(short, long)]
        session: String,
    },
    /// Sign out and discard the cached session
    SignOut,
    /// Show the signed-in user
    Whoami,
}
