use anyhow::Result;
use dialoguer::Select;
use owo_colors::OwoColorize;
use rekur_core::models::{EditScope, TaskInstance, TaskPatch};
use rekur_core::repository::TaskStore;
use rekur_core::scheduler::TaskScheduler;
use uuid::Uuid;

use crate::cli::EditCommand;
use crate::parser::parse_due_date;
use crate::util::resolve_task;
use crate::views::table::format_local;

pub async fn edit_task<S: TaskStore>(scheduler: &TaskScheduler<S>, owner: Uuid, command: EditCommand) -> Result<()> {
    let timezone = scheduler.config().timezone;
    let task = resolve_task(scheduler, owner, &command.id).await?;

    let description = if command.description_clear {
        Some(None)
    } else {
        command.description.map(Some)
    };

    let recurring_type = if command.recurrence_clear {
        Some(None)
    } else {
        command.every.map(Some)
    };

    let due_at = command.due.as_deref().map(|d| parse_due_date(d, timezone)).transpose()?;

    let patch = TaskPatch {
        title: command.title,
        description,
        category: command.category,
        reminder_minutes: command.reminder,
        recurring_type,
        planned_occurrences: None,
        due_at,
    };

    // An explicit scope is still checked against the task.
    if patch.is_empty() && command.scope.is_none() {
        println!("Nothing to change.");
        return Ok(());
    }

    let scope = if let Some(scope) = command.scope {
        scope
    } else if task.is_series_member() && !command.force_scope {
        prompt_scope(&task, timezone)?
    } else {
        EditScope::Single
    };

    let empty = patch.is_empty();
    let written = scheduler.update_task(owner, task.id, patch, scope).await?;
    if empty {
        println!("Nothing to change.");
        return Ok(());
    }

    match scope {
        EditScope::Single => println!("Updated task '{}'", task.title),
        EditScope::AllFuture => println!(
            "Updated '{}' and its future occurrences ({} tasks)",
            task.title, written
        ),
    }

    Ok(())
}

fn prompt_scope(task: &TaskInstance, timezone: chrono_tz::Tz) -> Result<EditScope> {
    let scope_options = vec![
        format!("This occurrence only ({})", format_local(task.due_at, timezone)),
        "This and future occurrences".to_string(),
    ];

    println!("{}", "This task is part of a recurring series.".yellow());
    let selection = Select::new()
        .with_prompt("How would you like to apply your changes?")
        .items(&scope_options)
        .default(0)
        .interact()?;

    Ok(if selection == 1 {
        EditScope::AllFuture
    } else {
        EditScope::Single
    })
}
