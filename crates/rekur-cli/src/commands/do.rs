use anyhow::Result;
use rekur_core::repository::TaskStore;
use rekur_core::scheduler::TaskScheduler;
use uuid::Uuid;

use crate::cli::DoCommand;
use crate::util::resolve_task;
use crate::views::table::format_local;

pub async fn do_task<S: TaskStore>(scheduler: &TaskScheduler<S>, owner: Uuid, command: DoCommand) -> Result<()> {
    let task = resolve_task(scheduler, owner, &command.id).await?;
    if task.completed {
        println!("Task '{}' is already completed.", task.title);
        return Ok(());
    }

    let result = scheduler.complete_task(owner, task.id).await?;
    println!("Completed task: '{}'", result.updated.title);

    if let Some(next) = result.spawned {
        println!(
            "Scheduled next occurrence '{}' for {}",
            next.title,
            format_local(next.due_at, scheduler.config().timezone)
        );
    }

    Ok(())
}
