use serde::{Deserialize, Serialize};

use crate::task::{Category, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !task.completed,
            StatusFilter::Completed => task.completed,
        }
    }

    /// Cycle order used by the filter bar: all -> active -> completed.
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "active" | "pending" => Ok(StatusFilter::Active),
            "completed" | "done" => Ok(StatusFilter::Completed),
            _ => Err(crate::error::CoreError::Parse(format!(
                "unknown status filter: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Filter {
    pub status: StatusFilter,
    pub category: Option<Category>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        if !self.status.matches(task) {
            return false;
        }
        match self.category {
            Some(category) => task.category == category,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
}

impl Counts {
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = Counts::default();
        for task in tasks {
            counts.total += 1;
            if task.completed {
                counts.completed += 1;
            } else {
                counts.active += 1;
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tasks() -> Vec<Task> {
        let mut done = Task::new("ship release").with_category(Category::Work);
        done.completed = true;
        vec![
            Task::new("buy milk").with_category(Category::Shopping),
            Task::new("review PR").with_category(Category::Work),
            done,
        ]
    }

    #[test]
    fn test_status_filter_matches() {
        let tasks = sample_tasks();
        assert!(StatusFilter::All.matches(&tasks[0]));
        assert!(StatusFilter::Active.matches(&tasks[0]));
        assert!(!StatusFilter::Completed.matches(&tasks[0]));
        assert!(StatusFilter::Completed.matches(&tasks[2]));
    }

    #[test]
    fn test_status_filter_cycle() {
        assert_eq!(StatusFilter::All.next(), StatusFilter::Active);
        assert_eq!(StatusFilter::Active.next(), StatusFilter::Completed);
        assert_eq!(StatusFilter::Completed.next(), StatusFilter::All);
    }

    #[test]
    fn test_status_filter_from_str_aliases() {
        assert_eq!("done".parse::<StatusFilter>().unwrap(), StatusFilter::Completed);
        assert_eq!("pending".parse::<StatusFilter>().unwrap(), StatusFilter::Active);
        assert!("someday".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_filter_combines_status_and_category() {
        let tasks = sample_tasks();
        let filter = Filter::new()
            .with_status(StatusFilter::Active)
            .with_category(Category::Work);
        let matched: Vec<_> = tasks.iter().filter(|t| filter.matches(t)).collect();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].title, "review PR");
    }

    #[test]
    fn test_counts_tally() {
        let tasks = sample_tasks();
        let counts = Counts::tally(&tasks);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.active, 2);
        assert_eq!(counts.completed, 1);
    }

    #[test]
    fn test_counts_tally_empty() {
        let counts = Counts::tally(&[]);
        assert_eq!(counts, Counts::default());
    }
}
