use anyhow::Result;
use dialoguer::Confirm;
use rekur_core::models::EditScope;
use rekur_core::repository::TaskStore;
use rekur_core::scheduler::TaskScheduler;
use uuid::Uuid;

use crate::cli::DeleteCommand;
use crate::util::resolve_task;

pub async fn delete_task<S: TaskStore>(scheduler: &TaskScheduler<S>, owner: Uuid, command: DeleteCommand) -> Result<()> {
    let task = resolve_task(scheduler, owner, &command.id).await?;

    if !command.force {
        let prompt = match command.scope {
            EditScope::Single => format!("Are you sure you want to delete task '{}'?", task.title),
            EditScope::AllFuture => format!(
                "Are you sure you want to delete '{}' and all of its future occurrences?",
                task.title
            ),
        };
        let confirmation = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let deleted = scheduler.delete_task(owner, task.id, command.scope).await?;
    println!("Deleted {} task(s).", deleted);

    Ok(())
}
