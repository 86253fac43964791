//! Plain-text rendering of task lists.

use simpletodo_core::{Task, TaskCounts};

pub fn print_active(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks yet. Add one to get started!");
        return;
    }
    for task in tasks {
        println!("{}", active_line(task));
    }
}

pub fn print_deleted(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No deleted tasks.");
        return;
    }
    for task in tasks {
        println!("{}", deleted_line(task));
    }
}

pub fn print_counts(counts: TaskCounts) {
    println!(
        "active: {} (completed: {})  deleted: {}",
        counts.active, counts.completed, counts.deleted
    );
}

fn active_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{mark}] {}  {}", task.id, task.text)
}

fn deleted_line(task: &Task) -> String {
    let deleted = task
        .deleted_at
        .map(|at| at.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_default();
    format!("{}  {}  (deleted {deleted})", task.id, task.text)
}
