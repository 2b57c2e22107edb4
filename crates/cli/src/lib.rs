pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "shoptalk",
    about = "Shoptalk operator CLI",
    long_about = "Operate the shoptalk demo: migrations, stock seeding, readiness checks, and one-shot chat messages against the local store.",
    after_help = "Examples:\n  shoptalk migrate\n  shoptalk seed\n  shoptalk doctor --json\n  shoptalk chat \"add SPORT001\""
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Seed stock counters from the demo catalog's base stock")]
    Seed,
    #[command(about = "Validate config, catalog integrity, and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Route one message through the agents against the local store")]
    Chat {
        #[arg(help = "The message to route, e.g. \"add SPORT001\"")]
        message: String,
        #[arg(long, help = "Session id to use instead of the configured demo session")]
        session: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Chat { message, session } => commands::chat::run(&message, session),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
