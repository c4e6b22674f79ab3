use crate::error::Error;
use crate::runner::{Context, Runnable, Runner};
use clap::ArgAction;
use eyre::Context as _;
use stackformation_engine::stack::StackApi;
use std::io::{self, Write};

#[derive(clap::Args, Clone)]
pub(crate) struct DeleteCommand {
    /// Name of the deployed stack
    #[arg()]
    stack: String,

    /// Don't ask for confirmation
    #[arg(short, long, action = ArgAction::SetTrue)]
    yes: bool,

    /// Return as soon as the deletion has started
    #[arg(long, action = ArgAction::SetTrue)]
    no_observe: bool,

    /// Seconds between two status checks
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,
}

impl Runnable for DeleteCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        DeleteRunner {
            command: self.clone(),
            context: context.clone(),
        }
    }
}

struct DeleteRunner {
    command: DeleteCommand,
    context: Context,
}

impl DeleteRunner {
    fn confirm(&self) -> eyre::Result<bool> {
        print!(
            "{} {} {}: ",
            console::style("Delete stack").bold(),
            console::style(&self.command.stack).bold().red(),
            console::style("[y/N]").dim()
        );

        io::stdout().flush()?;

        let mut input = String::new();

        io::stdin()
            .read_line(&mut input)
            .wrap_err("Failed to read input")?;

        Ok(matches!(input.trim().to_lowercase().as_ref(), "y" | "yes"))
    }
}

impl Runner for DeleteRunner {
    fn context(&self) -> &Context {
        &self.context
    }

    async fn run(&mut self) -> Result<(), Error> {
        let name = &self.command.stack;
        let cloud = self.cloud().await;

        let status = cloud
            .stack_status(name)
            .await?
            .ok_or_else(|| stackformation_engine::Error::StackNotFound(name.clone()))?;

        log::debug!("Status of {name} before deletion: {status}");

        if !self.command.yes && !self.confirm()? {
            println!("{}", console::style("Deletion canceled").dim().bold());
            return Ok(());
        }

        cloud.delete_stack(name).await?;
        println!("{} {name}", console::style("Deleting").bold().red());

        if self.command.no_observe {
            return Ok(());
        }

        super::observe(&cloud, name, self.command.interval).await
    }
}
