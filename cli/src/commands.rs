pub mod stack;
pub mod template;
use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Deploy, observe and inspect CloudFormation stacks
    #[clap(subcommand)]
    Stack(stack::StackCommands),

    /// Work with the merged templates of configured stacks
    #[clap(subcommand)]
    Template(template::TemplateCommands),
}
