use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use rekur_core::models::{TaskCategory, TaskInstance};

use crate::util::{series_position, short_id};

pub fn display_tasks(tasks: &[TaskInstance], timezone: Tz) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Category", "Due", "Remind At", "Series", "Status"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&task.id)));

        let mut display_name = String::new();
        if task.is_recurring {
            display_name.push('↻');
            display_name.push(' ');
        }
        display_name.push_str(&task.title);

        let mut name_cell = Cell::new(display_name);
        if task.completed {
            name_cell = name_cell.add_attribute(Attribute::CrossedOut).fg(Color::DarkGrey);
        }
        row.add_cell(name_cell);

        row.add_cell(category_cell(task.category));
        row.add_cell(due_cell(task, timezone));
        row.add_cell(Cell::new(format_local(task.remind_at(), timezone)));
        row.add_cell(Cell::new(series_position(task)));

        let status_cell = if task.completed {
            Cell::new("Completed").fg(Color::Green)
        } else {
            Cell::new("Pending")
        };
        row.add_cell(status_cell);

        table.add_row(row);
    }

    println!("{table}");
}

/// Key/value view of a single task.
pub fn display_task_details(task: &TaskInstance, timezone: Tz) {
    let mut table = Table::new();
    table.add_row(vec![Cell::new("ID").add_attribute(Attribute::Bold), Cell::new(task.id)]);
    table.add_row(vec![Cell::new("Title").add_attribute(Attribute::Bold), Cell::new(&task.title)]);
    table.add_row(vec![
        Cell::new("Description").add_attribute(Attribute::Bold),
        Cell::new(task.description.as_deref().unwrap_or("None")),
    ]);
    table.add_row(vec![Cell::new("Category").add_attribute(Attribute::Bold), category_cell(task.category)]);
    table.add_row(vec![
        Cell::new("Due").add_attribute(Attribute::Bold),
        Cell::new(format!("{} ({})", format_local(task.due_at, timezone), task.due_at.humanize())),
    ]);
    table.add_row(vec![
        Cell::new("Reminder").add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} minutes before, at {}",
            task.reminder_minutes,
            format_local(task.remind_at(), timezone)
        )),
    ]);
    table.add_row(vec![
        Cell::new("Status").add_attribute(Attribute::Bold),
        Cell::new(match task.completed_at {
            Some(at) => format!("Completed {}", format_local(at, timezone)),
            None => "Pending".to_string(),
        }),
    ]);
    table.add_row(vec![
        Cell::new("Repeats").add_attribute(Attribute::Bold),
        Cell::new(task.recurring_type.map_or("never".to_string(), |c| c.to_string())),
    ]);
    if let Some(series_id) = task.series_id {
        table.add_row(vec![Cell::new("Series").add_attribute(Attribute::Bold), Cell::new(series_id)]);
        table.add_row(vec![
            Cell::new("Occurrence").add_attribute(Attribute::Bold),
            Cell::new(series_position(task)),
        ]);
    }

    println!("{table}");
}

fn due_cell(task: &TaskInstance, timezone: Tz) -> Cell {
    let now = Utc::now();
    let text = format!("{} ({})", format_local(task.due_at, timezone), task.due_at.humanize());

    if task.completed {
        Cell::new(text)
    } else if task.due_at < now {
        Cell::new(text).fg(Color::Red) // Overdue
    } else if task.due_at.with_timezone(&timezone).date_naive() == now.with_timezone(&timezone).date_naive() {
        Cell::new(text).fg(Color::Yellow) // Due today
    } else {
        Cell::new(text)
    }
}

fn category_cell(category: TaskCategory) -> Cell {
    let cell = Cell::new(category);
    match category {
        TaskCategory::ServerRenewal | TaskCategory::Subscription => cell.fg(Color::Cyan),
        TaskCategory::ElectricityBill | TaskCategory::InternetBill | TaskCategory::WaterBill => cell.fg(Color::Yellow),
        TaskCategory::Rent | TaskCategory::Insurance => cell.fg(Color::Magenta),
        TaskCategory::Maintenance | TaskCategory::Other => cell,
    }
}

pub fn format_local(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant.with_timezone(&timezone).format("%Y-%m-%d %H:%M").to_string()
}
