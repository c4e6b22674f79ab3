use crate::error::Error;
use crate::render;
use crate::runner::{Context, Runnable, Runner};
use stackformation_engine::stack::StackApi;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct StackRow {
    #[tabled(rename = "Stack")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
}

#[derive(clap::Args, Clone)]
pub(crate) struct ListCommand {
    /// Only show stacks with names containing this
    #[arg()]
    filter: Option<String>,
}

impl Runnable for ListCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        ListRunner {
            command: self.clone(),
            context: context.clone(),
        }
    }
}

struct ListRunner {
    command: ListCommand,
    context: Context,
}

impl Runner for ListRunner {
    fn context(&self) -> &Context {
        &self.context
    }

    /// Prints out all stacks with their statuses
    async fn run(&mut self) -> Result<(), Error> {
        let cloud = self.cloud().await;
        let filter = self.command.filter.as_deref().unwrap_or_default();

        let rows: Vec<StackRow> = cloud
            .list_stacks()
            .await?
            .into_iter()
            .filter(|stack| stack.name.contains(filter))
            .map(|stack| StackRow {
                status: render::status(&stack.status),
                name: stack.name,
            })
            .collect();

        if rows.is_empty() {
            println!("{}", console::style("No stacks found").yellow());
            return Ok(());
        }

        let mut table = Table::new(rows);
        table.with(Style::modern());
        println!("{table}");
        Ok(())
    }
}
