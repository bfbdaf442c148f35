//! taskflow-tui — terminal UI for the task board.
//!
//! Theming in [theme]; state and view in [state] and [view]; worker messages
//! in [events]. Run with [run_app] against a worker the caller spawns.

pub mod events;
pub mod run;
pub mod state;
pub mod theme;
pub mod view;

pub use events::{AppEvent, AuthSnapshot, NetCommand};
pub use run::run_app;
pub use state::{Screen, TuiState};
pub use theme::Palette;
