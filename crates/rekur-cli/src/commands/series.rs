use anyhow::Result;
use owo_colors::OwoColorize;
use rekur_core::repository::TaskStore;
use rekur_core::scheduler::TaskScheduler;
use uuid::Uuid;

use crate::cli::SeriesCommand;
use crate::util::{resolve_task, short_id};
use crate::views::table::display_tasks;

pub async fn show_series<S: TaskStore>(scheduler: &TaskScheduler<S>, owner: Uuid, command: SeriesCommand) -> Result<()> {
    let task = resolve_task(scheduler, owner, &command.id).await?;
    let Some(series_id) = task.series_id else {
        println!("'{}' is not part of a recurring series.", task.title);
        return Ok(());
    };

    let members = scheduler.list_series(owner, series_id).await?;
    let pending = members.iter().filter(|t| t.is_pending()).count();
    println!(
        "Series {} · {} of {} planned occurrences present, {} pending",
        short_id(&series_id).yellow(),
        members.len(),
        task.planned_occurrences,
        pending
    );
    display_tasks(&members, scheduler.config().timezone);

    Ok(())
}
