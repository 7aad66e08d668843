pub mod task;
pub mod task_list;

pub use task::{Priority, PriorityFilter, Task};
pub use task_list::{IdGenerator, add_task, delete_task, edit_task, filter_tasks};
