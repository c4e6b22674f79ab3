use crate::error::Error;
use crate::runner::{Context, Runnable, Runner};
use clap::ArgAction;
use stackformation_engine::stack::{DeployAction, Deployment, StackCache};

#[derive(clap::Args, Clone)]
pub(crate) struct DeployCommand {
    /// Stack as configured in stacks.yml
    #[arg()]
    stack: String,

    /// What to do when the stack fails to create: ROLLBACK, DO_NOTHING or DELETE
    #[arg(long)]
    on_failure: Option<String>,

    /// Return as soon as the deployment has started
    #[arg(long, action = ArgAction::SetTrue)]
    no_observe: bool,

    /// Seconds between two status checks
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,
}

impl Runnable for DeployCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        DeployRunner {
            command: self.clone(),
            context: context.clone(),
        }
    }
}

struct DeployRunner {
    command: DeployCommand,
    context: Context,
}

impl Runner for DeployRunner {
    fn context(&self) -> &Context {
        &self.context
    }

    /// Merge the templates, resolve parameters, then create or update the stack
    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config()?;
        let stack = config.stack(&self.command.stack)?;
        let template_body = stack.merged_template()?;

        let on_failure = match &self.command.on_failure {
            Some(value) => value.parse()?,
            None => stack.on_failure()?,
        };

        let cloud = self.cloud().await;

        // Lookups of other stacks are shared by parameters and tags
        let mut cache = StackCache::new(&cloud);
        let parameters = stack.parameters(&mut cache).await?;
        let tags = stack.tags(&mut cache).await?;

        println!(
            "{} {}...",
            console::style("Deploying").bold().green(),
            console::style(stack.name).bold()
        );

        let action = Deployment {
            name: stack.name.to_string(),
            template_body,
            parameters,
            tags,
            on_failure,
        }
        .run(&cloud)
        .await?;

        let action = match action {
            DeployAction::Created => "Creating",
            DeployAction::Updated => "Updating",
        };

        println!("{} {}", console::style(action).dim(), stack.name);

        if self.command.no_observe {
            return Ok(());
        }

        super::observe(&cloud, stack.name, self.command.interval).await
    }
}
