use clap::Subcommand;
use misenplace_core::summarize;

use super::open_controller;

#[derive(Subcommand)]
pub enum LogAction {
    /// Every validation, oldest first
    List,
    /// Validation count and mean efficiency per cook
    Summary,
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let (_, controller) = open_controller()?;
    let records = controller.validation_log()?;

    match action {
        LogAction::List => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        LogAction::Summary => {
            println!("{}", serde_json::to_string_pretty(&summarize(&records))?);
        }
    }
    Ok(())
}
