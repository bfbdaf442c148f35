//! TUI state: screens, forms, the working task list, transient status.
//!
//! [TuiState] holds everything the view needs to render. Forms keep their
//! own buffers and focus so switching screens never loses half-typed input.

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use taskflow_api::Engine;
use taskflow_auth::{AuthMode, FlowMessage};
use taskflow_core::{Category, Counts, Filter, Priority, Task, TaskDraft, TaskStore};
use taskflow_extract::ExtractMode;

use crate::theme::Palette;

/// Transient status messages auto-clear after this long.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

/// Which screen is currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Board,
    QuickAdd,
    Extract,
}

/// Input fields on the auth screen. Which ones are visible depends on the
/// flow mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    Code,
    NewPassword,
}

/// Auth screen form. `mode` and `message` mirror the worker's flow; the
/// buffers are purely local until Enter submits them.
#[derive(Debug, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub message: Option<FlowMessage>,
    pub email: String,
    pub password: String,
    pub code: String,
    pub new_password: String,
    /// Index into [AuthForm::fields].
    pub focus: usize,
}

impl AuthForm {
    /// Fields shown for the current mode, in tab order.
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::SignIn | AuthMode::SignUp => &[AuthField::Email, AuthField::Password],
            AuthMode::Verify => &[AuthField::Code],
            AuthMode::NewPassword => &[AuthField::NewPassword],
        }
    }

    pub fn focused(&self) -> AuthField {
        let fields = self.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
            AuthField::Code => &self.code,
            AuthField::NewPassword => &self.new_password,
        }
    }

    fn value_mut(&mut self, field: AuthField) -> &mut String {
        match field {
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Code => &mut self.code,
            AuthField::NewPassword => &mut self.new_password,
        }
    }

    pub fn insert(&mut self, c: char) {
        let field = self.focused();
        self.value_mut(field).push(c);
    }

    pub fn backspace(&mut self) {
        let field = self.focused();
        self.value_mut(field).pop();
    }

    /// Switch flow mode, resetting focus and the one-shot code buffer.
    /// Email and password survive so verify -> sign-in needs no retyping.
    pub fn set_mode(&mut self, mode: AuthMode) {
        if self.mode != mode {
            self.mode = mode;
            self.focus = 0;
            self.code.clear();
        }
    }
}

/// Input fields on the quick-add form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    Title,
    Category,
    Priority,
    Due,
}

impl AddField {
    const ORDER: [AddField; 4] = [
        AddField::Title,
        AddField::Category,
        AddField::Priority,
        AddField::Due,
    ];
}

/// Quick-add form. Category and priority are picked by cycling; title and
/// due date are typed.
#[derive(Debug)]
pub struct AddForm {
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    /// Raw due-date text, parsed as YYYY-MM-DD on submit.
    pub due: String,
    pub focus: AddField,
}

impl Default for AddForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: Category::Other,
            priority: Priority::Medium,
            due: String::new(),
            focus: AddField::Title,
        }
    }
}

impl AddForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn focus_next(&mut self) {
        let pos = AddField::ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = AddField::ORDER[(pos + 1) % AddField::ORDER.len()];
    }

    pub fn focus_prev(&mut self) {
        let pos = AddField::ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = AddField::ORDER[(pos + AddField::ORDER.len() - 1) % AddField::ORDER.len()];
    }

    /// Left/Right on a cycling field; ignored on text fields.
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            AddField::Category => self.category = cycled(&Category::all(), self.category, forward),
            AddField::Priority => self.priority = cycled(&Priority::all(), self.priority, forward),
            AddField::Title | AddField::Due => {}
        }
    }

    pub fn insert(&mut self, c: char) {
        match self.focus {
            AddField::Title => self.title.push(c),
            AddField::Due => self.due.push(c),
            AddField::Category | AddField::Priority => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            AddField::Title => {
                self.title.pop();
            }
            AddField::Due => {
                self.due.pop();
            }
            AddField::Category | AddField::Priority => {}
        }
    }

    /// Validate the form into a draft. Errors are user-facing text.
    pub fn draft(&self) -> Result<TaskDraft, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        let mut draft = TaskDraft::new(title)
            .with_category(self.category)
            .with_priority(self.priority);
        let due = self.due.trim();
        if !due.is_empty() {
            let parsed = NaiveDate::parse_from_str(due, "%Y-%m-%d")
                .map_err(|_| format!("Bad due date {due:?}, expected YYYY-MM-DD"))?;
            draft = draft.with_due_date(parsed);
        }
        Ok(draft)
    }
}

fn cycled<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let pos = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if forward {
        (pos + 1) % options.len()
    } else {
        (pos + options.len() - 1) % options.len()
    };
    options[next]
}

/// Which half of the extract screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractFocus {
    Input,
    Results,
}

/// Extract screen: free text in, previewed tasks out. Results hold the
/// extractor's output until each entry is added or discarded.
#[derive(Debug)]
pub struct ExtractPanel {
    pub text: String,
    pub mode: ExtractMode,
    pub results: Vec<Task>,
    pub engine: Option<Engine>,
    pub elapsed_ms: Option<u64>,
    pub selected: usize,
    pub focus: ExtractFocus,
    /// True while a run is in flight; blocks a second Ctrl+E.
    pub running: bool,
}

impl Default for ExtractPanel {
    fn default() -> Self {
        Self {
            text: String::new(),
            mode: ExtractMode::General,
            results: Vec::new(),
            engine: None,
            elapsed_ms: None,
            selected: 0,
            focus: ExtractFocus::Input,
            running: false,
        }
    }
}

impl ExtractPanel {
    pub fn cycle_mode(&mut self, forward: bool) {
        self.mode = cycled(&ExtractMode::all(), self.mode, forward);
    }

    pub fn select_next(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + 1).min(self.results.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.results.get(self.selected)
    }

    /// Install a finished run's output and move focus to the preview.
    pub fn set_results(&mut self, tasks: Vec<Task>, engine: Engine, elapsed_ms: u64) {
        self.focus = if tasks.is_empty() {
            ExtractFocus::Input
        } else {
            ExtractFocus::Results
        };
        self.results = tasks;
        self.engine = Some(engine);
        self.elapsed_ms = Some(elapsed_ms);
        self.selected = 0;
        self.running = false;
    }

    /// Drop a preview entry once it has been persisted.
    pub fn remove(&mut self, id: &str) {
        if let Some(pos) = self.results.iter().position(|t| t.id == id) {
            self.results.remove(pos);
        }
        self.clamp();
        if self.results.is_empty() {
            self.focus = ExtractFocus::Input;
        }
    }

    /// Keep only the entries whose ids are listed (bulk-add leftovers).
    pub fn retain_only(&mut self, ids: &[String]) {
        self.results.retain(|t| ids.contains(&t.id));
        self.clamp();
        if self.results.is_empty() {
            self.focus = ExtractFocus::Input;
        }
    }

    /// Preview entries as (preview id, draft) pairs for bulk add.
    pub fn drafts(&self) -> Vec<(String, TaskDraft)> {
        self.results
            .iter()
            .map(|t| (t.id.clone(), TaskDraft::from(t)))
            .collect()
    }

    fn clamp(&mut self) {
        if self.selected >= self.results.len() {
            self.selected = self.results.len().saturating_sub(1);
        }
    }
}

/// TUI application state.
#[derive(Debug)]
pub struct TuiState {
    /// Current screen.
    pub screen: Screen,
    /// Auth screen form and flow mirror.
    pub auth: AuthForm,
    /// Working copy of the server's task list.
    pub tasks: TaskStore,
    /// Board filter (status + optional category).
    pub filter: Filter,
    /// Selected row in the filtered board list.
    pub selected: usize,
    /// Quick-add form.
    pub add: AddForm,
    /// Extract screen.
    pub extract: ExtractPanel,
    /// Signed-in username, shown in the header.
    pub username: Option<String>,
    /// Transient status text for the footer.
    pub status: String,
    /// When the status was set; used for auto-clear.
    pub status_set_at: Option<Instant>,
    /// Label of the network call in flight, if any.
    pub busy: Option<String>,
    /// When true, next draw should run; cleared after draw.
    pub needs_redraw: bool,
    /// Theme palette.
    pub palette: Palette,
}

impl Default for TuiState {
    fn default() -> Self {
        Self {
            screen: Screen::Auth,
            auth: AuthForm::default(),
            tasks: TaskStore::new(),
            filter: Filter::new(),
            selected: 0,
            add: AddForm::default(),
            extract: ExtractPanel::default(),
            username: None,
            status: String::new(),
            status_set_at: None,
            busy: None,
            needs_redraw: true,
            palette: Palette::dark(),
        }
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
        self.status_set_at = Some(Instant::now());
        self.needs_redraw = true;
    }

    /// Clear an expired status. Called once per loop iteration.
    pub fn tick_status(&mut self) {
        if let Some(set_at) = self.status_set_at
            && set_at.elapsed() > STATUS_TIMEOUT
        {
            self.status.clear();
            self.status_set_at = None;
            self.needs_redraw = true;
        }
    }

    /// Tasks visible under the current filter, in server order.
    pub fn visible(&self) -> Vec<&Task> {
        self.tasks.filtered(&self.filter)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.visible().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Keep the selection inside the filtered list after mutations.
    pub fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn cycle_status_filter(&mut self) {
        self.filter.status = self.filter.status.next();
        self.clamp_selection();
        self.needs_redraw = true;
    }

    /// None -> work -> ... -> other -> None.
    pub fn cycle_category_filter(&mut self) {
        let order = Category::all();
        self.filter.category = match self.filter.category {
            None => Some(order[0]),
            Some(current) => {
                let pos = order.iter().position(|c| *c == current).unwrap_or(0);
                if pos + 1 < order.len() {
                    Some(order[pos + 1])
                } else {
                    None
                }
            }
        };
        self.clamp_selection();
        self.needs_redraw = true;
    }

    pub fn counts(&self) -> Counts {
        self.tasks.counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_form_fields_follow_mode() {
        let mut form = AuthForm::default();
        assert_eq!(form.fields(), &[AuthField::Email, AuthField::Password]);
        form.set_mode(AuthMode::Verify);
        assert_eq!(form.fields(), &[AuthField::Code]);
        assert_eq!(form.focused(), AuthField::Code);
    }

    #[test]
    fn test_auth_form_focus_wraps() {
        let mut form = AuthForm::default();
        assert_eq!(form.focused(), AuthField::Email);
        form.focus_next();
        assert_eq!(form.focused(), AuthField::Password);
        form.focus_next();
        assert_eq!(form.focused(), AuthField::Email);
        form.focus_prev();
        assert_eq!(form.focused(), AuthField::Password);
    }

    #[test]
    fn test_auth_form_keeps_credentials_across_modes() {
        let mut form = AuthForm::default();
        form.insert('a');
        form.focus_next();
        form.insert('p');
        form.set_mode(AuthMode::Verify);
        form.insert('1');
        form.set_mode(AuthMode::SignIn);
        assert_eq!(form.email, "a");
        assert_eq!(form.password, "p");
        assert!(form.code.is_empty());
    }

    #[test]
    fn test_add_form_draft_requires_title() {
        let form = AddForm::default();
        assert!(form.draft().is_err());
    }

    #[test]
    fn test_add_form_draft_parses_due_date() {
        let mut form = AddForm::default();
        form.title = "pay rent".to_string();
        form.due = "2025-07-01".to_string();
        let draft = form.draft().unwrap();
        assert_eq!(draft.due_date, Some(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()));

        form.due = "next tuesday".to_string();
        assert!(form.draft().is_err());
    }

    #[test]
    fn test_add_form_cycles_category_and_priority() {
        let mut form = AddForm::default();
        form.focus = AddField::Category;
        let before = form.category;
        form.cycle(true);
        assert_ne!(form.category, before);
        form.cycle(false);
        assert_eq!(form.category, before);

        form.focus = AddField::Priority;
        form.cycle(true);
        assert_ne!(form.priority, Priority::Medium);
    }

    #[test]
    fn test_extract_panel_remove_clamps_selection() {
        let mut panel = ExtractPanel::default();
        panel.set_results(vec![Task::new("a"), Task::new("b")], Engine::Local, 3);
        assert_eq!(panel.focus, ExtractFocus::Results);
        panel.selected = 1;
        let last = panel.results[1].id.clone();
        panel.remove(&last);
        assert_eq!(panel.selected, 0);
        let first = panel.results[0].id.clone();
        panel.remove(&first);
        assert!(panel.results.is_empty());
        assert_eq!(panel.focus, ExtractFocus::Input);
    }

    #[test]
    fn test_extract_panel_retain_only() {
        let mut panel = ExtractPanel::default();
        let keep = Task::new("keep");
        let keep_id = keep.id.clone();
        panel.set_results(vec![Task::new("drop"), keep], Engine::Remote, 10);
        panel.retain_only(std::slice::from_ref(&keep_id));
        assert_eq!(panel.results.len(), 1);
        assert_eq!(panel.results[0].id, keep_id);
    }

    #[test]
    fn test_selection_follows_filter() {
        let mut state = TuiState::new();
        let mut done = Task::new("done");
        done.completed = true;
        state.tasks.replace_all(vec![Task::new("a"), Task::new("b"), done]);
        state.selected = 2;

        state.cycle_status_filter();
        assert_eq!(state.filter.status, taskflow_core::StatusFilter::Active);
        assert_eq!(state.visible().len(), 2);
        assert_eq!(state.selected, 1);
    }

    #[test]
    fn test_category_filter_cycles_back_to_none() {
        let mut state = TuiState::new();
        assert!(state.filter.category.is_none());
        for _ in 0..Category::all().len() {
            state.cycle_category_filter();
            assert!(state.filter.category.is_some());
        }
        state.cycle_category_filter();
        assert!(state.filter.category.is_none());
    }

    #[test]
    fn test_select_next_stops_at_end() {
        let mut state = TuiState::new();
        state.tasks.replace_all(vec![Task::new("a"), Task::new("b")]);
        state.select_next();
        state.select_next();
        state.select_next();
        assert_eq!(state.selected, 1);
        state.select_prev();
        state.select_prev();
        state.select_prev();
        assert_eq!(state.selected, 0);
    }
}
