use crate::error::Error;
use crate::runner::{Context, Runnable, Runner};

#[derive(clap::Args, Clone)]
pub(crate) struct ObserveCommand {
    /// Name of the deployed stack
    #[arg()]
    stack: String,

    /// Seconds between two status checks
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,
}

impl Runnable for ObserveCommand {
    fn runner(&self, context: &Context) -> impl Runner {
        ObserveRunner {
            command: self.clone(),
            context: context.clone(),
        }
    }
}

struct ObserveRunner {
    command: ObserveCommand,
    context: Context,
}

impl Runner for ObserveRunner {
    fn context(&self) -> &Context {
        &self.context
    }

    async fn run(&mut self) -> Result<(), Error> {
        let cloud = self.cloud().await;
        super::observe(&cloud, &self.command.stack, self.command.interval).await
    }
}
