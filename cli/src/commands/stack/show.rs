use crate::error::Error;
use crate::runner::{Context, Runnable, Runner};
use stackformation_engine::stack::StackCache;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Stack attribute listed by one of the commands
#[derive(Clone, Copy)]
enum Attribute {
    Outputs,
    Resources,
    Parameters,
    Tags,
}

impl Attribute {
    fn header(&self) -> [&'static str; 2] {
        match self {
            Attribute::Outputs => ["Output", "Value"],
            Attribute::Resources => ["Logical ID", "Physical ID"],
            Attribute::Parameters => ["Parameter", "Value"],
            Attribute::Tags => ["Tag", "Value"],
        }
    }
}

#[derive(clap::Args, Clone)]
pub(crate) struct OutputsCommand {
    /// Name of the deployed stack
    #[arg()]
    stack: String,
}

#[derive(clap::Args, Clone)]
pub(crate) struct ResourcesCommand {
    /// Name of the deployed stack
    #[arg()]
    stack: String,
}

#[derive(clap::Args, Clone)]
pub(crate) struct ParametersCommand {
    /// Name of the deployed stack
    #[arg()]
    stack: String,
}

#[derive(clap::Args, Clone)]
pub(crate) struct TagsCommand {
    /// Name of the deployed stack
    #[arg()]
    stack: String,
}

impl Runnable for OutputsCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        ShowRunner::new(&self.stack, Attribute::Outputs, context)
    }
}

impl Runnable for ResourcesCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        ShowRunner::new(&self.stack, Attribute::Resources, context)
    }
}

impl Runnable for ParametersCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        ShowRunner::new(&self.stack, Attribute::Parameters, context)
    }
}

impl Runnable for TagsCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        ShowRunner::new(&self.stack, Attribute::Tags, context)
    }
}

struct ShowRunner {
    stack: String,
    attribute: Attribute,
    context: Context,
}

impl ShowRunner {
    fn new(stack: &str, attribute: Attribute, context: &Context) -> Self {
        Self {
            stack: stack.to_string(),
            attribute,
            context: context.clone(),
        }
    }
}

impl Runner for ShowRunner {
    fn context(&self) -> &Context {
        &self.context
    }

    /// Prints the attribute of the stack as a two-column table
    async fn run(&mut self) -> Result<(), Error> {
        let cloud = self.cloud().await;
        let mut cache = StackCache::new(&cloud);

        let values = match self.attribute {
            Attribute::Outputs => cache.outputs(&self.stack).await?,
            Attribute::Resources => cache.resources(&self.stack).await?,
            Attribute::Parameters => cache.parameters(&self.stack).await?,
            Attribute::Tags => cache.tags(&self.stack).await?,
        };

        if values.is_empty() {
            println!("{}", console::style("Nothing to show").yellow());
            return Ok(());
        }

        let mut builder = Builder::default();
        builder.push_record(self.attribute.header());

        for (key, value) in values {
            builder.push_record([key.as_str(), value.as_str()]);
        }

        let mut table = builder.build();
        table.with(Style::modern());
        println!("{table}");
        Ok(())
    }
}
