use anyhow::Result;
use rekur_core::repository::TaskStore;
use rekur_core::scheduler::TaskScheduler;
use uuid::Uuid;

use crate::cli::UndoCommand;
use crate::util::resolve_task;

pub async fn undo_task<S: TaskStore>(scheduler: &TaskScheduler<S>, owner: Uuid, command: UndoCommand) -> Result<()> {
    let task = resolve_task(scheduler, owner, &command.id).await?;
    if task.is_pending() {
        println!("Task '{}' is already pending.", task.title);
        return Ok(());
    }

    let reopened = scheduler.reopen_task(owner, task.id).await?;
    println!("Reopened task: '{}'", reopened.title);

    Ok(())
}
