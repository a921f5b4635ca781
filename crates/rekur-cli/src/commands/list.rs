use anyhow::Result;
use rekur_core::repository::TaskStore;
use rekur_core::scheduler::TaskScheduler;
use uuid::Uuid;

use crate::cli::ListCommand;
use crate::views::table::display_tasks;

pub async fn list_tasks<S: TaskStore>(scheduler: &TaskScheduler<S>, owner: Uuid, command: ListCommand) -> Result<()> {
    let tasks: Vec<_> = scheduler
        .list_tasks(owner)
        .await?
        .into_iter()
        .filter(|t| !command.pending || t.is_pending())
        .filter(|t| command.category.map_or(true, |c| t.category == c))
        .collect();

    display_tasks(&tasks, scheduler.config().timezone);

    Ok(())
}
