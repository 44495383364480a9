mod cli;
mod commands;
mod progress;
mod settings;

use crate::cli::{Commands, JslbCli};
use logging::LogMode;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = JslbCli::parse_args();
    let global = cli.global;

    let log_mode = if global.background {
        LogMode::Background(commands::data_directory(&global)?)
    } else {
        LogMode::Cli
    };
    let _logging_guards = logging::init(log_mode, global.verbose)?;

    match cli.command {
        Commands::Build { project_path } => commands::build::run(&project_path, &global).await,
        Commands::Update {
            project_path,
            changed,
        } => commands::update::run(&project_path, &changed, &global).await,
        Commands::Clean { project_path } => commands::clean::run(&project_path, &global),
        Commands::List { project_path, json } => {
            commands::list::run(&project_path, json, &global)
        }
    }
}
