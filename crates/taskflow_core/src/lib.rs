pub mod config;
pub mod error;
pub mod filter;
pub mod store;
pub mod task;

pub use config::{AppConfig, PLACEHOLDER};
pub use error::{CoreError, Result};
pub use filter::{Counts, Filter, StatusFilter};
pub use store::TaskStore;
pub use task::{Category, Priority, Source, Task, TaskDraft, TaskPatch};
