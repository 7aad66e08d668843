// UI module - Rendering logic for the TUI

use chrono::{Datelike, Months, NaiveDate};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph,
        calendar::{CalendarEventStore, Monthly},
    },
};
use time::{Date, Month};
use tui_big_text::{BigText, PixelSize};

use crate::app::{App, Field, InputMode, NotificationKind, Panel, TaskForm};
use crate::models::{Priority, Task};

/// Helper function to get border style based on whether a panel is focused
fn get_border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Green,
        Priority::Medium => Color::Yellow,
        Priority::High => Color::Red,
    }
}

pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),   // Header
            Constraint::Length(6),   // Form and filters
            Constraint::Length(10),  // Calendar
            Constraint::Min(3),      // Task list
            Constraint::Length(1),   // Notification
            Constraint::Length(1),   // Footer
        ])
        .split(size);

    render_header(frame, main_layout[0]);

    let top_columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60),  // Add form
            Constraint::Percentage(40),  // Filters
        ])
        .split(main_layout[1]);

    render_form(frame, app, top_columns[0]);
    render_filters(frame, app, top_columns[1]);
    render_calendar(frame, app, main_layout[2]);
    render_task_list(frame, app, main_layout[3]);
    render_notification(frame, app, main_layout[4]);
    render_footer(frame, app, main_layout[5]);

    if app.editing.is_some() && matches!(app.input_mode, InputMode::EditTask(_)) {
        render_edit_panel(frame, app);
    }

    if app.input_mode == InputMode::DeletePanel {
        render_delete_panel(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .lines(vec!["Todo Manager".into()])
        .centered()
        .build();

    frame.render_widget(title, area);
}

/// Title, due date and priority lines shared by the add form and the edit popup.
fn form_lines(form: &TaskForm, active: Option<Field>) -> Vec<Line<'_>> {
    let field_style = |field: Field| {
        if active == Some(field) {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };
    let label = |text: &'static str, field: Field| {
        Span::styled(text, field_style(field).add_modifier(Modifier::BOLD))
    };

    let mut priority_spans = vec![label("Priority: ", Field::Priority)];
    for priority in Priority::ALL {
        let style = if priority == form.priority {
            Style::default()
                .bg(priority_color(priority))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(priority_color(priority))
        };
        priority_spans.push(Span::styled(format!(" {} ", priority), style));
        priority_spans.push(Span::raw(" "));
    }

    vec![
        Line::from(vec![
            label("Title: ", Field::Title),
            Span::styled(form.title.as_str(), field_style(Field::Title)),
        ]),
        Line::from(vec![
            label("Due Date (YYYY-MM-DD): ", Field::DueDate),
            Span::styled(form.due_date.as_str(), field_style(Field::DueDate)),
        ]),
        Line::from(priority_spans),
    ]
}

/// Places the terminal cursor at the end of the active text field.
fn set_form_cursor(frame: &mut Frame, form: &TaskForm, field: Field, area: Rect) {
    let (offset, len, row) = match field {
        Field::Title => (7, form.title.chars().count(), 0),
        Field::DueDate => (23, form.due_date.chars().count(), 1),
        Field::Priority => return,
    };

    // A title wider than the screen just hides the cursor.
    let Some(cursor_x) = u16::try_from(offset + len)
        .ok()
        .and_then(|dx| area.x.checked_add(dx))
    else {
        return;
    };
    let cursor_y = area.y.saturating_add(row);
    if cursor_x < area.right() && cursor_y < area.bottom() {
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let active = match app.input_mode {
        InputMode::NewTask(field) => Some(field),
        _ => None,
    };

    let block = Block::default()
        .title("Add Task")
        .borders(Borders::ALL)
        .border_style(get_border_style(app.focused_panel == Panel::Form));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = form_lines(&app.form, active);
    if active.is_none() {
        lines.push(Line::from(Span::styled(
            "a: add task",
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    if let Some(field) = active {
        set_form_cursor(frame, &app.form, field, inner);
    }
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title("Filters")
        .borders(Borders::ALL)
        .border_style(get_border_style(app.focused_panel == Panel::Filters));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let due_date = if app.input_mode == InputMode::FilterDate {
        Span::styled(
            app.calendar_cursor.format("%Y-%m-%d").to_string(),
            Style::default().fg(Color::Yellow),
        )
    } else if app.filter.due_date.is_empty() {
        Span::styled("Any", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.filter.due_date.as_str())
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Priority: ", bold),
            Span::raw(app.filter.priority.label()),
        ]),
        Line::from(vec![Span::styled("Due Date: ", bold), due_date]),
        Line::from(Span::styled(
            "p: priority  f: pick date  c: clear date",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_calendar(frame: &mut Frame, app: &App, area: Rect) {
    let picking = app.input_mode == InputMode::FilterDate;
    let block = Block::default()
        .title("Calendar")
        .borders(Borders::ALL)
        .border_style(get_border_style(picking));

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let calendar_columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),  // Previous month
            Constraint::Percentage(34),  // Current month
            Constraint::Percentage(33),  // Next month
        ])
        .split(inner_area);

    let mut events = CalendarEventStore::default();

    // Due dates that aren't real dates simply don't show up here.
    for task in &app.tasks {
        if let Some(due) = parse_due_date(&task.due_date).and_then(chrono_to_time_date) {
            events.add(due, Style::default().bg(Color::DarkGray).fg(Color::White));
        }
    }

    if let Some(today) = chrono_to_time_date(app.today) {
        events.add(today, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    }

    if let Some(filtered) = parse_due_date(&app.filter.due_date).and_then(chrono_to_time_date) {
        events.add(filtered, Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD));
    }

    if picking {
        if let Some(cursor) = chrono_to_time_date(app.calendar_cursor) {
            events.add(cursor, Style::default().bg(Color::Yellow).fg(Color::Black).add_modifier(Modifier::BOLD));
        }
    }

    let months = [
        app.calendar_month.checked_sub_months(Months::new(1)),
        Some(app.calendar_month),
        app.calendar_month.checked_add_months(Months::new(1)),
    ];

    for (i, month) in months.iter().enumerate() {
        let Some(display_date) = month.and_then(chrono_to_time_date) else {
            continue;
        };

        let header_style = if i == 1 {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let calendar = Monthly::new(display_date, events.clone())
            .show_month_header(header_style)
            .show_weekdays_header(Style::default());

        frame.render_widget(calendar, calendar_columns[i]);
    }
}

fn parse_due_date(due_date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(due_date, "%Y-%m-%d").ok()
}

fn chrono_to_time_date(date: NaiveDate) -> Option<Date> {
    let month = Month::try_from(date.month() as u8).ok()?;
    Date::from_calendar_date(date.year(), month, date.day() as u8).ok()
}

fn task_item(task: &Task) -> ListItem<'_> {
    ListItem::new(task.display_string()).style(Style::default().fg(priority_color(task.priority)))
}

fn render_task_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title("Tasks")
        .borders(Borders::ALL)
        .border_style(get_border_style(app.focused_panel == Panel::List));

    if !app.is_ready() {
        let loading = Paragraph::new("Loading tasks...")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let visible = app.visible_tasks();
    if visible.is_empty() {
        let empty = Paragraph::new("No tasks found.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|task| task_item(task)).collect();
    let task_list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol(">> ");

    let mut list_state = ListState::default();
    list_state.select(app.selected_index);

    frame.render_stateful_widget(task_list, area, &mut list_state);
}

fn render_notification(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(notification) = &app.notification {
        let color = match notification.kind {
            NotificationKind::Error => Color::Red,
            NotificationKind::Warning => Color::Yellow,
        };
        let banner = Paragraph::new(notification.message.as_str())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(banner, area);
    }
}

fn render_edit_panel(frame: &mut Frame, app: &App) {
    let Some(buffer) = &app.editing else {
        return;
    };
    let active = match app.input_mode {
        InputMode::EditTask(field) => Some(field),
        _ => None,
    };

    let popup_area = centered_rect(60, 40, frame.area());
    frame.render_widget(Clear, popup_area);

    let popup_block = Block::default()
        .title("Edit Task")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));

    let inner_area = popup_block.inner(popup_area);
    frame.render_widget(popup_block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(3),     // Fields
            Constraint::Length(2),  // Instructions
        ])
        .split(inner_area);

    frame.render_widget(Paragraph::new(form_lines(&buffer.draft, active)), chunks[0]);

    let instructions = Paragraph::new(
        "Tab: Next field | ←/→: Priority | Enter: Save | Esc: Cancel"
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[1]);

    if let Some(field) = active {
        set_form_cursor(frame, &buffer.draft, field, chunks[0]);
    }
}

fn render_delete_panel(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, popup_area);

    let popup_block = Block::default()
        .title("Delete?")
        .borders(Borders::ALL)
        .style(Style::default().bg(Color::Black));

    let inner_area = popup_block.inner(popup_area);
    frame.render_widget(popup_block, popup_area);

    let Some(task) = app
        .deleting_task_id
        .as_ref()
        .and_then(|id| app.tasks.iter().find(|t| &t.id == id))
    else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(2),     // Task
            Constraint::Length(1),  // Buttons
            Constraint::Length(2),  // Instructions
        ])
        .split(inner_area);

    let task_para = Paragraph::new(task.display_string())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(task_para, chunks[0]);

    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(chunks[1]);

    let yes_style = if app.delete_panel_yes_selected {
        Style::default().bg(Color::Green).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let yes_button = Paragraph::new("[ Yes ]")
        .style(yes_style)
        .alignment(Alignment::Center);
    frame.render_widget(yes_button, button_chunks[0]);

    let no_style = if !app.delete_panel_yes_selected {
        Style::default().bg(Color::Red).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red)
    };
    let no_button = Paragraph::new("[ No ]")
        .style(no_style)
        .alignment(Alignment::Center);
    frame.render_widget(no_button, button_chunks[1]);

    let instructions = Paragraph::new(
        "Tab/Left/Right: Switch buttons | Enter: Confirm | Esc: Cancel"
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[2]);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::NewTask(_) => &[("tab ", ": next field  "), ("enter ", ": add  "), ("esc ", ": back")],
        InputMode::EditTask(_) => &[("tab ", ": next field  "), ("enter ", ": save  "), ("esc ", ": cancel")],
        InputMode::FilterDate => &[("←/→/↑/↓ ", ": move  "), ("t ", ": today  "), ("enter ", ": filter  "), ("c ", ": clear  "), ("esc ", ": back")],
        InputMode::DeletePanel => &[("enter ", ": confirm  "), ("esc ", ": cancel")],
        InputMode::Normal => &[
            (" a ", ": add  "),
            ("e ", ": edit  "),
            ("- ", ": delete  "),
            ("p ", ": priority  "),
            ("f ", ": date  "),
            ("tab ", ": panels  "),
            ("q ", ": quit"),
        ],
    };

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(k, text)| [Span::styled(*k, key), Span::raw(*text)])
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::{MemoryBlobStore, TASKS_RECORD, TaskStore};
    use ratatui::{Terminal, backend::TestBackend};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        buffer_text(&terminal)
    }

    fn app_with(content: &str) -> App {
        let blobs = MemoryBlobStore::with_record(TASKS_RECORD, content);
        let mut app = App::new(TaskStore::new(Box::new(blobs)), &AppConfig::default());
        app.load();
        app
    }

    #[test]
    fn empty_list_says_no_tasks_found() {
        let screen = draw(&app_with("[]"));
        assert!(screen.contains("No tasks found."));
    }

    #[test]
    fn rows_show_formatted_due_date_and_priority() {
        let app = app_with(
            r#"[{"id":"1","title":"Buy milk","dueDate":"2025-07-26","priority":"low"}]"#,
        );
        let screen = draw(&app);
        assert!(screen.contains("Buy milk  26/07/25 • low"));
    }

    #[test]
    fn delete_panel_shows_the_task() {
        let mut app = app_with(
            r#"[{"id":"1","title":"Buy milk","dueDate":"2025-07-26","priority":"low"}]"#,
        );
        app.focused_panel = Panel::List;
        app.open_delete_panel();
        let screen = draw(&app);
        assert!(screen.contains("Delete?"));
        assert!(screen.contains("[ Yes ]"));
    }

    #[test]
    fn very_long_title_renders_without_a_cursor() {
        let mut app = app_with("[]");
        app.open_new_task_form();
        app.form.title = "x".repeat(70_000);

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        assert!(buffer_text(&terminal).contains("xxxx"));
    }

    #[test]
    fn calendar_conversion_keeps_the_day() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let converted = chrono_to_time_date(date).unwrap();
        assert_eq!(
            (converted.year(), converted.month() as u8, converted.day()),
            (2025, 2, 28)
        );
    }
}
