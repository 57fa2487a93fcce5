use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Personal task scheduler with repeat rules.
#[derive(Parser, Debug)]
#[command(name = "planner", version, about)]
pub struct Cli {
    /// Task store file (overrides TODO_DBFILE).
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Maximum number of tasks to list (overrides TODO_LIST_LIMIT).
    #[arg(long, global = true)]
    pub limit: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the next date of a repeat rule without touching the store.
    NextDate {
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        repeat: String,
        /// Reference day as YYYYMMDD; defaults to now.
        #[arg(long)]
        now: Option<String>,
    },
    /// Add a task.
    Add(TaskArgs),
    /// List tasks ordered by date.
    List {
        /// Text to look for in title or comment, or a DD.MM.YYYY date.
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one task.
    Show { id: String },
    /// Replace every field of a task.
    Update {
        id: String,
        #[command(flatten)]
        task: TaskArgs,
    },
    /// Mark a task done: one-off tasks are deleted, recurring ones advance.
    Done { id: String },
    /// Delete a task.
    Delete { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct TaskArgs {
    #[arg(long)]
    pub title: String,
    /// YYYYMMDD; empty means today.
    #[arg(long, default_value = "")]
    pub date: String,
    #[arg(long, default_value = "")]
    pub comment: String,
    #[arg(long, default_value = "")]
    pub repeat: String,
}
