use clap::{Parser, Subcommand};
use rekur_core::cadence::Cadence;
use rekur_core::models::{EditScope, TaskCategory};

/// Rekur: reminders for bills, renewals and everything else that comes back
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a task or a recurring series
    Add(AddCommand),
    /// List tasks
    List(ListCommand),
    /// Show the details of a task
    Show(ShowCommand),
    /// Edit a task, or it and its future occurrences
    Edit(EditCommand),
    /// Delete a task, or it and its future occurrences
    Delete(DeleteCommand),
    /// Mark a task as completed
    Do(DoCommand),
    /// Mark a completed task as pending again
    Undo(UndoCommand),
    /// Show every occurrence of a task's series
    Series(SeriesCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the task
    pub title: String,
    /// The due date of the task (e.g. "tomorrow 9am", "2025-03-01 18:00")
    #[clap(long)]
    pub due: String,
    /// The description of the task
    #[clap(short, long)]
    pub description: Option<String>,
    /// The category of the task
    #[clap(short, long, default_value = "other")]
    pub category: TaskCategory,
    /// Minutes before the due date to be reminded
    #[clap(short, long)]
    pub reminder: Option<i64>,
    /// Repeat the task (daily, weekly, monthly)
    #[clap(long)]
    pub every: Option<Cadence>,
    /// Number of occurrences to create for a recurring task
    #[clap(long, requires = "every", default_value = "1")]
    pub count: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Only show pending tasks
    #[clap(short, long)]
    pub pending: bool,
    /// Only show tasks of this category
    #[clap(short, long)]
    pub category: Option<TaskCategory>,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// The ID of the task to show
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the task to edit
    pub id: String,

    /// Apply to this occurrence only (single) or to it and all later ones (future)
    #[arg(long)]
    pub scope: Option<EditScope>,

    /// Force scope without prompting (for scripting)
    #[arg(long, help = "Use the single scope without interactive prompting")]
    pub force_scope: bool,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "description")]
    pub description_clear: bool,

    #[arg(long)]
    pub category: Option<TaskCategory>,

    #[arg(long)]
    pub due: Option<String>,

    #[arg(long)]
    pub reminder: Option<i64>,

    #[arg(long, help = "Change the recurrence type (daily, weekly, monthly)")]
    pub every: Option<Cadence>,
    #[arg(long, conflicts_with = "every", help = "Stop recurring (the task keeps its series position)")]
    pub recurrence_clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the task to delete
    pub id: String,
    /// Delete this occurrence only (single) or it and all later ones (future)
    #[clap(long, default_value = "single")]
    pub scope: EditScope,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the task to mark as completed
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct UndoCommand {
    /// The ID of the task to mark as pending
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SeriesCommand {
    /// The ID of any occurrence of the series
    pub id: String,
}
