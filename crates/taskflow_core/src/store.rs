use crate::filter::{Counts, Filter};
use crate::task::Task;

/// In-memory working copy of the server's task list. The server owns the
/// data; this holds whatever the last fetch returned plus optimistic
/// updates, and is discarded on exit.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    pub fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    /// Replaces the task with the same id, or appends if unknown.
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.push(task),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Flips completion in place and returns the new state.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let task = self.get_mut(id)?;
        task.toggle();
        Some(task.completed)
    }

    pub fn filtered(&self, filter: &Filter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn counts(&self) -> Counts {
        Counts::tally(&self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::StatusFilter;
    use crate::task::Category;

    fn store_with(titles: &[&str]) -> TaskStore {
        let mut store = TaskStore::new();
        for title in titles {
            store.push(Task::new(*title));
        }
        store
    }

    #[test]
    fn test_replace_all() {
        let mut store = store_with(&["old"]);
        store.replace_all(vec![Task::new("a"), Task::new("b")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.tasks()[0].title, "a");
    }

    #[test]
    fn test_upsert_replaces_matching_id() {
        let mut store = TaskStore::new();
        let task = Task::new("draft report");
        let id = task.id.clone();
        store.push(task);

        let mut updated = store.get(&id).unwrap().clone();
        updated.title = "final report".to_string();
        store.upsert(updated);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&id).unwrap().title, "final report");
    }

    #[test]
    fn test_upsert_appends_unknown_id() {
        let mut store = store_with(&["existing"]);
        store.upsert(Task::new("new"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut store = TaskStore::new();
        let task = Task::new("buy milk");
        let id = task.id.clone();
        store.push(task);

        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.title, "buy milk");
        assert!(store.is_empty());
        assert!(store.remove(&id).is_none());
    }

    #[test]
    fn test_toggle() {
        let mut store = TaskStore::new();
        let task = Task::new("buy milk");
        let id = task.id.clone();
        store.push(task);

        assert_eq!(store.toggle(&id), Some(true));
        assert_eq!(store.toggle(&id), Some(false));
        assert_eq!(store.toggle("missing"), None);
    }

    #[test]
    fn test_filtered() {
        let mut store = TaskStore::new();
        store.push(Task::new("buy milk").with_category(Category::Shopping));
        store.push(Task::new("review PR").with_category(Category::Work));
        let done_id = store.tasks()[0].id.clone();
        store.toggle(&done_id);

        let filter = Filter::new().with_status(StatusFilter::Active);
        let active = store.filtered(&filter);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "review PR");
    }

    #[test]
    fn test_counts() {
        let mut store = store_with(&["a", "b", "c"]);
        let id = store.tasks()[1].id.clone();
        store.toggle(&id);

        let counts = store.counts();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.active, 2);
        assert_eq!(counts.completed, 1);
    }
}
