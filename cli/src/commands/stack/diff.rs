use crate::error::Error;
use crate::process;
use crate::runner::{Context, Runnable, Runner};
use eyre::Context as _;
use stackformation_engine::stack::StackApi;
use std::ffi::OsStr;
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(clap::Args, Clone)]
pub(crate) struct DiffCommand {
    /// Stack as configured in stacks.yml
    #[arg()]
    stack: String,
}

impl Runnable for DiffCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        DiffRunner {
            command: self.clone(),
            context: context.clone(),
        }
    }
}

struct DiffRunner {
    command: DiffCommand,
    context: Context,
}

/// Temporary file with the template, removed when dropped
fn temporary(prefix: &str, template: &str) -> eyre::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".json")
        .tempfile()
        .wrap_err("Failed to create a temporary file")?;

    writeln!(file, "{}", template.trim()).wrap_err("Failed to write a temporary file")?;
    Ok(file)
}

impl Runner for DiffRunner {
    fn context(&self) -> &Context {
        &self.context
    }

    /// Show a unified diff from the deployed template to the locally merged one
    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config()?;
        let stack = config.stack(&self.command.stack)?;
        let local = stack.merged_template()?;

        let cloud = self.cloud().await;
        let live = cloud.stack_template(stack.name).await?;

        let live_file = temporary("sfn_live_", &live)?;
        let local_file = temporary("sfn_local_", &local)?;

        let program = if process::is_installed("colordiff") {
            "colordiff"
        } else {
            "diff"
        };

        let status = process::passthru(
            program,
            [
                OsStr::new("-u"),
                live_file.path().as_os_str(),
                local_file.path().as_os_str(),
            ],
        )?;

        // diff exits with 1 when the files differ
        match status.code() {
            Some(0) => {
                println!("{}", console::style("No differences").dim());
                Ok(())
            }

            Some(1) => Ok(()),

            _ => Err(self.error(
                Some("Failed to compare templates"),
                Some(&format!("{program} exited with {status}")),
                None,
            )),
        }
    }
}
