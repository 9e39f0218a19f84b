//! Task management commands for CLI.

use chrono::NaiveDate;
use clap::Subcommand;
use misenplace_core::{Frequency, TaskKey};

use super::{open_controller, sign_in, Session};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create an empty task file if none exists
    Init,
    /// Add a new task, scheduled for today
    Add {
        /// Task name
        name: String,
        /// once, daily or weekly
        #[arg(long, default_value = "daily")]
        frequency: String,
        /// Target time in minutes
        #[arg(long)]
        target: i64,
    },
    /// List tasks due today
    List {
        /// List every task instead
        #[arg(long)]
        all: bool,
    },
    /// Validate a task
    Validate {
        /// Task name
        name: String,
        /// Time spent in minutes
        #[arg(long)]
        minutes: i64,
        /// Scheduled date (YYYY-MM-DD) when several tasks share a name
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Cook name (defaults to the signed-in user)
        #[arg(long)]
        cook: Option<String>,
    },
}

pub fn run(action: TaskAction, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let (config, controller) = open_controller()?;

    match action {
        TaskAction::Init => {
            if controller.init_store()? {
                println!("Task file created: {}", controller.store().path().display());
            } else {
                println!("Task file exists: {}", controller.store().path().display());
            }
        }
        TaskAction::Add {
            name,
            frequency,
            target,
        } => {
            let frequency: Frequency = frequency.parse()?;
            sign_in(&config, session)?;
            let task = controller.add_task(&name, frequency, target)?;
            println!("Task added: {}", task.name);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { all } => {
            let tasks = if all {
                controller.store().load()?
            } else {
                controller.due_today()?
            };
            println!("{}", serde_json::to_string_pretty(&tasks)?);
        }
        TaskAction::Validate {
            name,
            minutes,
            date,
            cook,
        } => {
            let principal = sign_in(&config, session)?;
            let cook = cook.or_else(|| principal.map(|p| p.name));
            let key = match date {
                Some(date) => TaskKey::new(name).on(date),
                None => TaskKey::new(name),
            };

            let (task, record) = controller.validate_task(&key, minutes, cook.as_deref())?;
            println!(
                "Task validated: {} ({}% {})",
                task.name, record.efficiency, record.tag
            );
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
    }
    Ok(())
}
