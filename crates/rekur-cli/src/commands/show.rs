use anyhow::Result;
use rekur_core::repository::TaskStore;
use rekur_core::scheduler::TaskScheduler;
use uuid::Uuid;

use crate::cli::ShowCommand;
use crate::util::resolve_task;
use crate::views::table::display_task_details;

pub async fn show_task<S: TaskStore>(scheduler: &TaskScheduler<S>, owner: Uuid, command: ShowCommand) -> Result<()> {
    let task = resolve_task(scheduler, owner, &command.id).await?;
    display_task_details(&task, scheduler.config().timezone);
    Ok(())
}
