use crate::error::Error;
use crate::runner::{Context, Runnable, Runner};
use eyre::Context as _;
use std::path::PathBuf;

#[derive(clap::Args, Clone)]
pub(crate) struct MergeCommand {
    /// Stack as configured in stacks.yml
    #[arg()]
    stack: String,

    /// Write the template to a file instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Runnable for MergeCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        MergeRunner {
            command: self.clone(),
            context: context.clone(),
        }
    }
}

struct MergeRunner {
    command: MergeCommand,
    context: Context,
}

impl Runner for MergeRunner {
    fn context(&self) -> &Context {
        &self.context
    }

    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config()?;
        let stack = config.stack(&self.command.stack)?;

        for (prefix, path) in stack.template_files() {
            log::debug!("Merging {} with prefix {prefix:?}", path.display());
        }

        let template = stack.merged_template()?;

        let Some(output) = &self.command.output else {
            println!("{template}");
            return Ok(());
        };

        std::fs::write(output, &template)
            .wrap_err_with(|| format!("Failed to write {}", output.display()))?;

        println!(
            "{} {} {}",
            console::style("Merged").bold().green(),
            console::style(format!("({} bytes)", template.len())).dim(),
            output.display()
        );

        Ok(())
    }
}
