// Task model - A single todo item and its priority

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn next(&self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Priority::Low => Priority::High,
            Priority::Medium => Priority::Low,
            Priority::High => Priority::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority selection for the list view. `All` matches every task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriorityFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl PriorityFilter {
    pub fn next(&self) -> Self {
        match self {
            PriorityFilter::All => PriorityFilter::Low,
            PriorityFilter::Low => PriorityFilter::Medium,
            PriorityFilter::Medium => PriorityFilter::High,
            PriorityFilter::High => PriorityFilter::All,
        }
    }

    pub fn matches(&self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Low => priority == Priority::Low,
            PriorityFilter::Medium => priority == Priority::Medium,
            PriorityFilter::High => priority == Priority::High,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityFilter::All => "All",
            PriorityFilter::Low => "Low",
            PriorityFilter::Medium => "Medium",
            PriorityFilter::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub due_date: String,
    pub priority: Priority,
}

impl Task {
    pub fn new(id: String, title: String, due_date: String, priority: Priority) -> Self {
        Self {
            id,
            title,
            due_date,
            priority,
        }
    }

    /// Row text for the list view: `title  DD/MM/YY • priority`.
    pub fn display_string(&self) -> String {
        format!(
            "{}  {} • {}",
            self.title,
            format_due_date(&self.due_date),
            self.priority
        )
    }
}

/// Formats `YYYY-MM-DD` as `DD/MM/YY`. Anything else is returned as-is.
pub fn format_due_date(due_date: &str) -> String {
    let parts: Vec<&str> = due_date.split('-').collect();
    match parts.as_slice() {
        [year, month, day] => match year.get(year.len().saturating_sub(2)..) {
            Some(short_year) => format!("{}/{}/{}", day, month, short_year),
            None => due_date.to_string(),
        },
        _ => due_date.to_string(),
    }
}
