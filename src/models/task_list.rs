// Task list operations - Pure add/edit/delete/filter over an ordered task list
//
// Every operation takes the current list by reference and returns a new one.
// The caller decides when to persist.

use chrono::Utc;

use crate::error::TaskError;
use crate::models::{Priority, PriorityFilter, Task};

/// Hands out task ids as decimal millisecond timestamps, strictly increasing
/// within the process even when several tasks are created in the same
/// millisecond.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
    // Ids handed out once `last` has reached `u64::MAX`.
    spilled: u64,
}

impl IdGenerator {
    /// Starts above every numeric id already present in `tasks`.
    pub fn seeded_from(tasks: &[Task]) -> Self {
        let last = tasks
            .iter()
            .filter_map(|t| t.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self { last, spilled: 0 }
    }

    pub fn next_id(&mut self) -> String {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_id_at(now)
    }

    fn next_id_at(&mut self, now_millis: u64) -> String {
        match self.last.checked_add(1) {
            Some(floor) => {
                let id = now_millis.max(floor);
                self.last = id;
                id.to_string()
            }
            // Numeric ids are exhausted; suffixed ids never parse back as
            // numbers, so they can't collide with a loaded one.
            None => {
                self.spilled += 1;
                format!("{}-{}", self.last, self.spilled)
            }
        }
    }
}

pub fn add_task(
    tasks: &[Task],
    ids: &mut IdGenerator,
    title: &str,
    due_date: &str,
    priority: Priority,
) -> Result<Vec<Task>, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::empty_title());
    }

    let mut updated = tasks.to_vec();
    updated.push(Task::new(
        ids.next_id(),
        title.to_string(),
        due_date.to_string(),
        priority,
    ));
    Ok(updated)
}

/// Replaces the task with `id`. An unknown id leaves the list as it was.
pub fn edit_task(
    tasks: &[Task],
    id: &str,
    title: &str,
    due_date: &str,
    priority: Priority,
) -> Result<Vec<Task>, TaskError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(TaskError::empty_title());
    }

    Ok(tasks
        .iter()
        .map(|task| {
            if task.id == id {
                Task::new(
                    task.id.clone(),
                    title.to_string(),
                    due_date.to_string(),
                    priority,
                )
            } else {
                task.clone()
            }
        })
        .collect())
}

pub fn delete_task(tasks: &[Task], id: &str) -> Vec<Task> {
    tasks.iter().filter(|t| t.id != id).cloned().collect()
}

/// Tasks matching both the priority filter and the due date filter, in list
/// order. An empty `due_date` matches every task.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    priority: PriorityFilter,
    due_date: &'a str,
) -> impl Iterator<Item = &'a Task> + 'a {
    tasks
        .iter()
        .filter(move |t| priority.matches(t.priority))
        .filter(move |t| due_date.is_empty() || t.due_date == due_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, title: &str, due_date: &str, priority: Priority) -> Task {
        Task::new(id.into(), title.into(), due_date.into(), priority)
    }

    fn sample() -> Vec<Task> {
        vec![
            task("1", "Water plants", "2025-07-26", Priority::Low),
            task("2", "File taxes", "2025-07-27", Priority::High),
            task("3", "Call mum", "2025-07-26", Priority::High),
            task("4", "Book dentist", "2025-07-28", Priority::Medium),
        ]
    }

    #[test]
    fn add_to_empty_list() {
        let mut ids = IdGenerator::default();
        let result = add_task(&[], &mut ids, "New Task", "2025-07-26", Priority::Low).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "New Task");
        assert_eq!(result[0].due_date, "2025-07-26");
        assert_eq!(result[0].priority, Priority::Low);
    }

    #[test]
    fn add_trims_title() {
        let mut ids = IdGenerator::default();
        let result =
            add_task(&[], &mut ids, "   Trimmed   ", "2025-07-26", Priority::Medium).unwrap();
        assert_eq!(result[0].title, "Trimmed");
    }

    #[test]
    fn add_rejects_blank_title() {
        let mut ids = IdGenerator::default();
        let tasks = sample();
        let before = tasks.clone();

        let err = add_task(&tasks, &mut ids, "  \t ", "2025-07-26", Priority::High).unwrap_err();

        assert!(matches!(err, TaskError::Validation(_)));
        assert_eq!(err.to_string(), "Title cannot be empty");
        assert_eq!(tasks, before);
    }

    #[test]
    fn add_appends_and_keeps_existing_tasks() {
        let mut ids = IdGenerator::seeded_from(&sample());
        let tasks = sample();

        let result = add_task(&tasks, &mut ids, "Another", "2025-07-29", Priority::Low).unwrap();

        assert_eq!(result.len(), tasks.len() + 1);
        assert_eq!(&result[..tasks.len()], tasks.as_slice());
        assert_eq!(result[tasks.len()].title, "Another");
    }

    #[test]
    fn add_assigns_distinct_ids_in_quick_succession() {
        let mut ids = IdGenerator::default();
        let mut tasks = Vec::new();
        for n in 0..50 {
            tasks = add_task(&tasks, &mut ids, &format!("task {n}"), "", Priority::Low).unwrap();
        }
        let mut seen: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 50);
    }

    #[test]
    fn id_generator_is_monotonic_within_one_millisecond() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.next_id_at(1_000), "1000");
        assert_eq!(ids.next_id_at(1_000), "1001");
        assert_eq!(ids.next_id_at(999), "1002");
        assert_eq!(ids.next_id_at(5_000), "5000");
    }

    #[test]
    fn id_generator_skips_past_loaded_ids() {
        let tasks = vec![
            task("1721980800000", "a", "", Priority::Low),
            task("not-a-number", "b", "", Priority::Low),
        ];
        let mut ids = IdGenerator::seeded_from(&tasks);
        assert_eq!(ids.next_id_at(10), "1721980800001");
    }

    #[test]
    fn id_generator_survives_max_numeric_id() {
        let tasks = vec![task("18446744073709551615", "a", "", Priority::Low)];
        let mut ids = IdGenerator::seeded_from(&tasks);

        let first = ids.next_id_at(10);
        let second = ids.next_id_at(10);

        assert_eq!(first, "18446744073709551615-1");
        assert_eq!(second, "18446744073709551615-2");

        let result = add_task(&tasks, &mut ids, "b", "", Priority::High).unwrap();
        assert_eq!(result.len(), 2);
        assert_ne!(result[1].id, result[0].id);
    }

    #[test]
    fn edit_replaces_only_the_matching_task() {
        let tasks = sample();

        let result = edit_task(&tasks, "2", "  File tax return ", "2025-08-01", Priority::Medium)
            .unwrap();

        assert_eq!(result.len(), tasks.len());
        assert_eq!(
            result[1],
            task("2", "File tax return", "2025-08-01", Priority::Medium)
        );
        assert_eq!(result[0], tasks[0]);
        assert_eq!(result[2], tasks[2]);
        assert_eq!(result[3], tasks[3]);
    }

    #[test]
    fn edit_with_unknown_id_is_a_no_op() {
        let tasks = sample();
        let result = edit_task(&tasks, "missing", "Whatever", "2025-01-01", Priority::Low).unwrap();
        assert_eq!(result, tasks);
    }

    #[test]
    fn edit_rejects_blank_title() {
        let tasks = sample();
        let err = edit_task(&tasks, "1", "   ", "2025-01-01", Priority::Low).unwrap_err();
        assert_eq!(err.to_string(), "Title cannot be empty");
        assert_eq!(tasks, sample());
    }

    #[test]
    fn delete_removes_matching_task_and_keeps_order() {
        let tasks = sample();
        let result = delete_task(&tasks, "2");
        let ids: Vec<&str> = result.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "4"]);
    }

    #[test]
    fn delete_with_unknown_id_is_a_no_op() {
        let tasks = sample();
        assert_eq!(delete_task(&tasks, "99"), tasks);
    }

    #[test]
    fn filter_all_returns_everything_in_order() {
        let tasks = sample();
        let view: Vec<&Task> = filter_tasks(&tasks, PriorityFilter::All, "").collect();
        assert_eq!(view, tasks.iter().collect::<Vec<_>>());
    }

    #[test]
    fn filter_by_priority() {
        let tasks = sample();
        let ids: Vec<&str> = filter_tasks(&tasks, PriorityFilter::High, "")
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn filter_by_due_date() {
        let tasks = sample();
        let ids: Vec<&str> = filter_tasks(&tasks, PriorityFilter::All, "2025-07-26")
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn filter_combines_both_predicates() {
        let tasks = sample();
        let ids: Vec<&str> = filter_tasks(&tasks, PriorityFilter::High, "2025-07-26")
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["3"]);

        let none: Vec<&Task> = filter_tasks(&tasks, PriorityFilter::Medium, "2025-07-26").collect();
        assert!(none.is_empty());
    }

    #[test]
    fn filter_reflects_the_current_list() {
        let tasks = sample();
        let before = filter_tasks(&tasks, PriorityFilter::High, "").count();
        let tasks = delete_task(&tasks, "3");
        let after = filter_tasks(&tasks, PriorityFilter::High, "").count();
        assert_eq!((before, after), (2, 1));
    }
}
