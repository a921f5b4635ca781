use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use rekur_core::models::{CreatedTasks, TaskDefinition};
use rekur_core::repository::TaskStore;
use rekur_core::scheduler::TaskScheduler;
use uuid::Uuid;

use crate::cli::AddCommand;
use crate::parser::parse_due_date;
use crate::util::short_id;
use crate::views::table::format_local;

pub async fn add_task<S: TaskStore>(scheduler: &TaskScheduler<S>, owner: Uuid, command: AddCommand) -> Result<()> {
    let timezone = scheduler.config().timezone;
    let due_at = parse_due_date(&command.due, timezone)?;

    let definition = TaskDefinition {
        title: command.title,
        description: command.description,
        category: command.category,
        due_at,
        reminder_minutes: command.reminder,
        recurring_type: command.every,
        occurrences: command.count,
    };

    let created = scheduler.create_task(owner, definition).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let subtle_style = Style::new().bright_black();

    match &created {
        CreatedTasks::Single(task) => {
            println!("{} Created task: {}", "✓".style(success_style), task.title.bright_white().bold());
            // Left uncoloured so the id can be copied or piped as is.
            println!("  {} Task ID: {}", "→".style(info_style), short_id(&task.id));
            println!(
                "  {} Due: {}",
                "→".style(info_style),
                format_local(task.due_at, timezone).cyan()
            );
        }
        CreatedTasks::Series(tasks) => {
            let (Some(first), Some(last)) = (tasks.first(), tasks.last()) else {
                return Ok(());
            };
            println!(
                "{} Created recurring series: {} ({} occurrences)",
                "✓".style(success_style),
                first.title.bright_white().bold(),
                tasks.len()
            );
            println!("  {} Series ID: {}", "→".style(info_style), short_id(&first.id));
            println!(
                "  {} From {} to {}",
                "→".style(info_style),
                format_local(first.due_at, timezone).cyan(),
                format_local(last.due_at, timezone).cyan()
            );
            println!(
                "   {} View occurrences: rekur series {}",
                "•".style(subtle_style),
                short_id(&first.id).yellow()
            );
        }
    }

    Ok(())
}
