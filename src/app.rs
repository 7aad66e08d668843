// App module - Application state and key handling
//
// The App owns the live task list. Every change goes through the pure
// functions in `models::task_list` and is then handed to the TaskStore, but
// only once the initial load has finished.

use chrono::{Datelike, Local, Months, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use serde::{Deserialize, Serialize};
use std::io::Stdout;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::error::TaskError;
use crate::models::{
    IdGenerator, Priority, PriorityFilter, Task, add_task, delete_task, edit_task, filter_tasks,
};
use crate::storage::TaskStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Title,
    DueDate,
    Priority,
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::Title => Field::DueDate,
            Field::DueDate => Field::Priority,
            Field::Priority => Field::Title,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Field::Title => Field::Priority,
            Field::DueDate => Field::Title,
            Field::Priority => Field::DueDate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    NewTask(Field),
    EditTask(Field),
    FilterDate,
    DeletePanel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Panel {
    Form,
    Filters,
    List,
}

impl Panel {
    pub fn next(&self) -> Self {
        match self {
            Panel::Form => Panel::Filters,
            Panel::Filters => Panel::List,
            Panel::List => Panel::Form,
        }
    }
}

/// Field values of the create form, also used as the draft while editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskForm {
    pub title: String,
    pub due_date: String,
    pub priority: Priority,
}

impl TaskForm {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            due_date: date.format(DATE_FORMAT).to_string(),
            priority: Priority::Low,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            due_date: task.due_date.clone(),
            priority: task.priority,
        }
    }

    pub fn input_char(&mut self, field: Field, c: char) {
        match field {
            Field::Title => self.title.push(c),
            Field::DueDate => {
                if (c.is_ascii_digit() || c == '-') && self.due_date.len() < 10 {
                    self.due_date.push(c);
                }
            }
            Field::Priority => {
                if c == ' ' {
                    self.priority = self.priority.next();
                }
            }
        }
    }

    pub fn backspace(&mut self, field: Field) {
        match field {
            Field::Title => {
                self.title.pop();
            }
            Field::DueDate => {
                self.due_date.pop();
            }
            Field::Priority => {}
        }
    }

    /// The date field must hold a real `YYYY-MM-DD` date before submitting.
    pub fn check_due_date(&self) -> Result<(), TaskError> {
        let well_formed = self.due_date.len() == 10
            && NaiveDate::parse_from_str(&self.due_date, DATE_FORMAT).is_ok();
        if well_formed {
            Ok(())
        } else {
            Err(TaskError::validation("Due date must be YYYY-MM-DD"))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub priority: PriorityFilter,
    /// Empty means no due date filter.
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditBuffer {
    pub id: String,
    pub draft: TaskForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub shown_at: Instant,
}

pub struct App {
    pub should_quit: bool,
    pub lifecycle: Lifecycle,
    pub today: NaiveDate,
    pub tasks: Vec<Task>,
    pub form: TaskForm,
    pub filter: TaskFilter,
    pub editing: Option<EditBuffer>,
    pub input_mode: InputMode,
    pub focused_panel: Panel,
    pub selected_index: Option<usize>,
    pub calendar_month: NaiveDate,
    pub calendar_cursor: NaiveDate,
    pub delete_panel_yes_selected: bool,
    pub deleting_task_id: Option<String>,
    pub notification: Option<Notification>,
    notification_timeout: Duration,
    ids: IdGenerator,
    store: TaskStore,
}

impl App {
    pub fn new(store: TaskStore, config: &AppConfig) -> Self {
        let today = Local::now().date_naive();

        Self {
            should_quit: false,
            lifecycle: Lifecycle::Loading,
            today,
            tasks: Vec::new(),
            form: TaskForm::for_date(today),
            filter: TaskFilter::default(),
            editing: None,
            input_mode: InputMode::Normal,
            focused_panel: Panel::Form,
            selected_index: None,
            calendar_month: today,
            calendar_cursor: today,
            delete_panel_yes_selected: true,
            deleting_task_id: None,
            notification: None,
            notification_timeout: config.notification_timeout(),
            ids: IdGenerator::default(),
            store,
        }
    }

    /// Reads the persisted list and enables saving. Must run before the first
    /// change is made, otherwise the empty startup list would be written over
    /// the stored one.
    pub fn load(&mut self) {
        self.tasks = self.store.load();
        self.ids = IdGenerator::seeded_from(&self.tasks);
        self.lifecycle = Lifecycle::Ready;
        self.clamp_selection();
        tracing::info!(target: "app", count = self.tasks.len(), "Ready");
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Ready
    }

    /// Tasks passing the current filters, in list order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter_tasks(&self.tasks, self.filter.priority, &self.filter.due_date).collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_index
            .and_then(|index| self.visible_tasks().get(index).copied())
    }

    fn apply(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.clamp_selection();
        self.persist();
    }

    fn persist(&mut self) {
        if !self.is_ready() {
            tracing::debug!(target: "app", "Skipping save until the initial load completes");
            return;
        }

        if let Err(err) = self.store.save(&self.tasks) {
            self.notify(&TaskError::from(err));
        }
    }

    pub fn notify(&mut self, err: &TaskError) {
        let kind = match err {
            TaskError::Validation(_) => NotificationKind::Error,
            TaskError::Persistence(_) => NotificationKind::Warning,
        };
        self.show_notification(err.to_string(), kind);
    }

    /// Shows a warning that didn't come from a task operation, such as a
    /// startup problem the app can run without fixing.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.show_notification(message.into(), NotificationKind::Warning);
    }

    fn show_notification(&mut self, message: String, kind: NotificationKind) {
        self.notification = Some(Notification {
            message,
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Drops the banner once it has been visible for the configured time.
    pub fn expire_notification(&mut self, now: Instant) {
        let expired = self.notification.as_ref().is_some_and(|notification| {
            now.saturating_duration_since(notification.shown_at) >= self.notification_timeout
        });
        if expired {
            self.notification = None;
        }
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_tasks().len();
        self.selected_index = match self.selected_index {
            _ if count == 0 => None,
            Some(i) if i >= count => Some(count - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
    }

    fn select_task_id(&mut self, id: &str) {
        let position = self.visible_tasks().iter().position(|t| t.id == id);
        if position.is_some() {
            self.selected_index = position;
        }
    }

    pub fn next_panel(&mut self) {
        self.focused_panel = self.focused_panel.next();
    }

    pub fn select_previous_task(&mut self) {
        let count = self.visible_tasks().len();
        if count == 0 {
            self.selected_index = None;
            return;
        }

        self.selected_index = Some(match self.selected_index {
            Some(i) if i > 0 => i - 1,
            Some(_) => count - 1,
            None => 0,
        });
    }

    pub fn select_next_task(&mut self) {
        let count = self.visible_tasks().len();
        if count == 0 {
            self.selected_index = None;
            return;
        }

        self.selected_index = Some(match self.selected_index {
            Some(i) if i < count - 1 => i + 1,
            Some(_) => 0,
            None => 0,
        });
    }

    // New task form

    pub fn open_new_task_form(&mut self) {
        self.focused_panel = Panel::Form;
        self.input_mode = InputMode::NewTask(Field::Title);
    }

    pub fn submit_new_task(&mut self) {
        if let Err(err) = self.form.check_due_date() {
            self.notify(&err);
            return;
        }

        match add_task(
            &self.tasks,
            &mut self.ids,
            &self.form.title,
            &self.form.due_date,
            self.form.priority,
        ) {
            Ok(tasks) => {
                let new_id = tasks.last().map(|t| t.id.clone());
                self.apply(tasks);
                if let Some(id) = new_id {
                    tracing::info!(target: "app", id = %id, "Added task");
                    self.select_task_id(&id);
                }
                self.form = TaskForm::for_date(self.today);
                self.input_mode = InputMode::Normal;
            }
            Err(err) => self.notify(&err),
        }
    }

    // Inline edit

    pub fn start_editing(&mut self) {
        let buffer = self.selected_task().map(|task| EditBuffer {
            id: task.id.clone(),
            draft: TaskForm::from_task(task),
        });
        if buffer.is_some() {
            self.editing = buffer;
            self.input_mode = InputMode::EditTask(Field::Title);
        }
    }

    pub fn save_edit(&mut self) {
        let Some(buffer) = self.editing.clone() else {
            self.input_mode = InputMode::Normal;
            return;
        };

        if let Err(err) = buffer.draft.check_due_date() {
            self.notify(&err);
            return;
        }

        match edit_task(
            &self.tasks,
            &buffer.id,
            &buffer.draft.title,
            &buffer.draft.due_date,
            buffer.draft.priority,
        ) {
            Ok(tasks) => {
                self.apply(tasks);
                tracing::info!(target: "app", id = %buffer.id, "Edited task");
                self.cancel_edit();
            }
            Err(err) => self.notify(&err),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.input_mode = InputMode::Normal;
    }

    // Delete confirmation

    pub fn open_delete_panel(&mut self) {
        if let Some(id) = self.selected_task().map(|task| task.id.clone()) {
            self.deleting_task_id = Some(id);
            self.delete_panel_yes_selected = true;
            self.input_mode = InputMode::DeletePanel;
        }
    }

    pub fn close_delete_panel(&mut self) {
        self.deleting_task_id = None;
        self.delete_panel_yes_selected = true;
        self.input_mode = InputMode::Normal;
    }

    pub fn toggle_delete_button(&mut self) {
        self.delete_panel_yes_selected = !self.delete_panel_yes_selected;
    }

    pub fn confirm_delete(&mut self) {
        if let Some(id) = self.deleting_task_id.clone() {
            let tasks = delete_task(&self.tasks, &id);
            self.apply(tasks);
            tracing::info!(target: "app", id = %id, "Deleted task");
        }
        self.close_delete_panel();
    }

    // Filters

    pub fn cycle_priority_filter(&mut self) {
        self.filter.priority = self.filter.priority.next();
        self.clamp_selection();
    }

    pub fn open_date_filter(&mut self) {
        self.focused_panel = Panel::Filters;
        self.calendar_cursor = NaiveDate::parse_from_str(&self.filter.due_date, DATE_FORMAT)
            .unwrap_or(self.today);
        self.update_calendar_view();
        self.input_mode = InputMode::FilterDate;
    }

    pub fn apply_date_filter(&mut self) {
        self.filter.due_date = self.calendar_cursor.format(DATE_FORMAT).to_string();
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    pub fn clear_date_filter(&mut self) {
        self.filter.due_date.clear();
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    pub fn move_calendar_cursor(&mut self, days: i64) {
        self.calendar_cursor = self.calendar_cursor + chrono::Duration::days(days);
        self.update_calendar_view();
    }

    pub fn reset_calendar_to_today(&mut self) {
        self.calendar_cursor = self.today;
        self.calendar_month = self.today;
    }

    /// The calendar shows the month of `calendar_month` plus its neighbours.
    /// Recentre it when the cursor walks outside that window.
    fn update_calendar_view(&mut self) {
        let first = self.calendar_month.with_day(1).unwrap_or(self.calendar_month);
        let window_start = first.checked_sub_months(Months::new(1));
        let window_end = first.checked_add_months(Months::new(2));

        let inside = match (window_start, window_end) {
            (Some(start), Some(end)) => self.calendar_cursor >= start && self.calendar_cursor < end,
            _ => false,
        };
        if !inside {
            self.calendar_month = self.calendar_cursor;
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        loop {
            terminal.draw(|frame| crate::ui::render(frame, self))?;

            if let Some(key) = crate::event::next_key_press(Duration::from_millis(100))? {
                self.handle_key_event(key);
            }

            self.expire_notification(Instant::now());

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.input_mode.clone() {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::NewTask(field) | InputMode::EditTask(field) => {
                self.handle_form_key(key, field)
            }
            InputMode::FilterDate => match key.code {
                KeyCode::Left => self.move_calendar_cursor(-1),
                KeyCode::Right => self.move_calendar_cursor(1),
                KeyCode::Up => self.move_calendar_cursor(-7),
                KeyCode::Down => self.move_calendar_cursor(7),
                KeyCode::Char('t') => self.reset_calendar_to_today(),
                KeyCode::Enter => self.apply_date_filter(),
                KeyCode::Backspace | KeyCode::Delete | KeyCode::Char('c') => {
                    self.clear_date_filter()
                }
                KeyCode::Esc => self.input_mode = InputMode::Normal,
                _ => {}
            },
            InputMode::DeletePanel => match key.code {
                KeyCode::Tab | KeyCode::Left | KeyCode::Right => self.toggle_delete_button(),
                KeyCode::Enter => {
                    if self.delete_panel_yes_selected {
                        self.confirm_delete();
                    } else {
                        self.close_delete_panel();
                    }
                }
                KeyCode::Esc => self.close_delete_panel(),
                _ => {}
            },
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.next_panel(),
            KeyCode::Char('a') | KeyCode::Char('+') => self.open_new_task_form(),
            KeyCode::Char('p') => self.cycle_priority_filter(),
            KeyCode::Char('f') => self.open_date_filter(),
            KeyCode::Char('c') => self.clear_date_filter(),
            KeyCode::Up if self.focused_panel == Panel::List => self.select_previous_task(),
            KeyCode::Down if self.focused_panel == Panel::List => self.select_next_task(),
            KeyCode::Enter => match self.focused_panel {
                Panel::Form => self.open_new_task_form(),
                Panel::Filters => self.open_date_filter(),
                Panel::List => self.start_editing(),
            },
            KeyCode::Char('e') if self.focused_panel == Panel::List => self.start_editing(),
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Delete
                if self.focused_panel == Panel::List =>
            {
                self.open_delete_panel()
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent, field: Field) {
        let editing = matches!(self.input_mode, InputMode::EditTask(_));

        match key.code {
            KeyCode::Enter => {
                if editing {
                    self.save_edit();
                } else {
                    self.submit_new_task();
                }
            }
            KeyCode::Esc => {
                if editing {
                    self.cancel_edit();
                } else {
                    // The half-filled form is kept for later.
                    self.input_mode = InputMode::Normal;
                }
            }
            KeyCode::Tab => self.set_form_field(field.next()),
            KeyCode::BackTab => self.set_form_field(field.previous()),
            code => {
                let Some(form) = self.active_form_mut() else {
                    return;
                };
                match code {
                    KeyCode::Char(c) => form.input_char(field, c),
                    KeyCode::Backspace => form.backspace(field),
                    KeyCode::Left if field == Field::Priority => {
                        form.priority = form.priority.previous()
                    }
                    KeyCode::Right if field == Field::Priority => {
                        form.priority = form.priority.next()
                    }
                    _ => {}
                }
            }
        }
    }

    fn set_form_field(&mut self, field: Field) {
        self.input_mode = match self.input_mode {
            InputMode::NewTask(_) => InputMode::NewTask(field),
            InputMode::EditTask(_) => InputMode::EditTask(field),
            ref other => other.clone(),
        };
    }

    fn active_form_mut(&mut self) -> Option<&mut TaskForm> {
        match self.input_mode {
            InputMode::NewTask(_) => Some(&mut self.form),
            InputMode::EditTask(_) => self.editing.as_mut().map(|buffer| &mut buffer.draft),
            _ => None,
        }
    }
}
