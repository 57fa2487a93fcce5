pub mod cli;
pub mod config;

use std::io::Write;

use anyhow::{Context, Result};
use planner_core::Task;
use planner_domain::{JsonFileStore, TaskService};
use serde_json::json;
use tracing::debug;

use crate::cli::{Command, TaskArgs};
use crate::config::AppConfig;

/// Executes one command, writing its result to `out`.
pub fn run(command: Command, config: &AppConfig, out: &mut impl Write) -> Result<()> {
    let service = || open_service(config);
    match command {
        Command::NextDate { date, repeat, now } => {
            let next = TaskService::builder()
                .build()
                .next_date(now.as_deref(), &date, &repeat)?;
            writeln!(out, "{next}")?;
        }
        Command::Add(args) => {
            let stored = service()?.add_task(task_from_args(args))?;
            write_json(out, &stored)?;
        }
        Command::List { search } => {
            let tasks = service()?.list_tasks(search.as_deref())?;
            write_json(out, &json!({ "tasks": tasks }))?;
        }
        Command::Show { id } => {
            write_json(out, &service()?.get_task(&id)?)?;
        }
        Command::Update { id, task } => {
            let updated = service()?.update_task_by_id(&id, task_from_args(task))?;
            write_json(out, &updated)?;
        }
        Command::Done { id } => match service()?.complete_task(&id)? {
            Some(task) => write_json(out, &task)?,
            None => write_json(out, &json!({}))?,
        },
        Command::Delete { id } => {
            service()?.delete_task(&id)?;
            write_json(out, &json!({}))?;
        }
    }
    Ok(())
}

fn open_service(config: &AppConfig) -> Result<TaskService> {
    debug!(path = %config.store_path.display(), "opening task store");
    let store = JsonFileStore::open(&config.store_path).with_context(|| {
        format!(
            "failed to open task store {}",
            config.store_path.display()
        )
    })?;
    Ok(TaskService::builder()
        .with_store(store)
        .with_list_limit(config.list_limit)
        .build())
}

fn task_from_args(args: TaskArgs) -> Task {
    Task::new(args.title)
        .with_date(args.date)
        .with_comment(args.comment)
        .with_repeat(args.repeat)
}

fn write_json(out: &mut impl Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
