mod cloud;
mod commands;
mod config;
mod error;
mod logger;
mod process;
mod render;
mod runner;
use crate::commands::stack::StackCommands;
use crate::commands::template::TemplateCommands;
use crate::commands::Commands;
use crate::error::Error;
use crate::logger::Logger;
use crate::runner::{Context, Runnable, Runner};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Path to the stacks config, stacks.yml in the current directory by default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// AWS region, the default chain is used when not set
    #[arg(long, global = true)]
    region: Option<String>,

    /// AWS profile from the shared config files
    #[arg(long, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Derive a runner from the command and run it
async fn run(command: impl Runnable, context: &Context) -> Result<(), Error> {
    command.runner(context).run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    Logger::init(cli.verbose);

    let context = Context {
        config: cli.config,
        region: cli.region,
        profile: cli.profile,
    };

    // Match all commands here, in one place
    let result = match cli.command {
        Commands::Stack(command) => match command {
            StackCommands::List(cmd) => run(cmd, &context).await,
            StackCommands::Deploy(cmd) => run(cmd, &context).await,
            StackCommands::Observe(cmd) => run(cmd, &context).await,
            StackCommands::Delete(cmd) => run(cmd, &context).await,
            StackCommands::Outputs(cmd) => run(cmd, &context).await,
            StackCommands::Resources(cmd) => run(cmd, &context).await,
            StackCommands::Parameters(cmd) => run(cmd, &context).await,
            StackCommands::Tags(cmd) => run(cmd, &context).await,
            StackCommands::Diff(cmd) => run(cmd, &context).await,
        },

        Commands::Template(command) => match command {
            TemplateCommands::Merge(cmd) => run(cmd, &context).await,
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,

        Err(error) => {
            eprintln!("\n{}\n{error}", console::style("Error").red().bold());
            ExitCode::FAILURE
        }
    }
}
