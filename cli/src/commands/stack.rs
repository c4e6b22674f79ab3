pub mod delete;
pub mod deploy;
pub mod diff;
pub mod list;
pub mod observe;
pub mod show;
use crate::error::Error;
use crate::render::ConsoleSink;
use clap::Subcommand;
use stackformation_engine::stack::StackApi;
use stackformation_engine::{Observer, Outcome};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Subcommand)]
pub(crate) enum StackCommands {
    /// List stacks which haven't been deleted
    List(list::ListCommand),

    /// Merge the templates of a stack and deploy it
    Deploy(deploy::DeployCommand),

    /// Follow a running stack operation until it finishes
    Observe(observe::ObserveCommand),

    /// [DANGER] Delete a stack
    Delete(delete::DeleteCommand),

    /// Show the outputs of a stack
    Outputs(show::OutputsCommand),

    /// Show the physical ids of a stack's resources
    Resources(show::ResourcesCommand),

    /// Show the parameters a stack is deployed with
    Parameters(show::ParametersCommand),

    /// Show the tags of a stack
    Tags(show::TagsCommand),

    /// Compare the deployed template with the local one
    Diff(diff::DiffCommand),
}

/// Observe the stack until the running operation finishes
///
/// Ctrl-C stops the observation, the operation itself carries on.
/// A stack ending in a failed status is returned as an error.
pub(crate) async fn observe(api: &dyn StackApi, stack: &str, interval: u64) -> Result<(), Error> {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let mut sink = ConsoleSink::new(stack);

    let observation = Observer::new(api)
        .with_poll_interval(Duration::from_secs(interval))
        .with_cancellation(cancel)
        .observe(stack, &mut sink)
        .await;

    ctrl_c.abort();
    let observation = observation?;

    match observation.outcome {
        Outcome::Success => Ok(()),

        Outcome::Failure => Err(Error::new(
            &format!("Stack {stack} failed"),
            Some(&format!(
                "The operation ended in {}, check the events above for the reason",
                observation.status
            )),
        )),
    }
}
