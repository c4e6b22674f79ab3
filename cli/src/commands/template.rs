pub mod merge;
use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum TemplateCommands {
    /// Print or save the merged template of a stack
    Merge(merge::MergeCommand),
}
