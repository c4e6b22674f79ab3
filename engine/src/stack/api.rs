use super::{StackEvent, StackStatus};
use crate::error::Error;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// What CloudFormation does with a stack which failed to create
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnFailure {
    #[default]
    Rollback,
    DoNothing,
    Delete,
}

impl OnFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnFailure::Rollback => "ROLLBACK",
            OnFailure::DoNothing => "DO_NOTHING",
            OnFailure::Delete => "DELETE",
        }
    }
}

impl FromStr for OnFailure {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ROLLBACK" => Ok(OnFailure::Rollback),
            "DO_NOTHING" => Ok(OnFailure::DoNothing),
            "DELETE" => Ok(OnFailure::Delete),
            other => Err(Error::InvalidOnFailure(other.to_string())),
        }
    }
}

impl fmt::Display for OnFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stack parameter value
///
/// `None` keeps the value the stack was last deployed with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackParameter {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CreateStack {
    pub name: String,
    pub template_body: String,
    pub parameters: Vec<StackParameter>,
    pub tags: BTreeMap<String, String>,
    pub on_failure: OnFailure,
}

#[derive(Clone, Debug)]
pub struct UpdateStack {
    pub name: String,
    pub template_body: String,
    pub parameters: Vec<StackParameter>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StackSummary {
    pub name: String,
    pub status: StackStatus,
}

/// Operations on the cloud orchestration service
///
/// Implementations don't retry, failures are returned as [`Error::Api`].
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Current status, `None` when there is no such stack
    async fn stack_status(&self, name: &str) -> Result<Option<StackStatus>, Error>;

    /// Events of the stack, newest first
    ///
    /// Implementations may stop at the event that started the latest operation.
    async fn stack_events(&self, name: &str) -> Result<Vec<StackEvent>, Error>;

    async fn stack_outputs(&self, name: &str) -> Result<BTreeMap<String, String>, Error>;

    async fn stack_parameters(&self, name: &str) -> Result<BTreeMap<String, String>, Error>;

    async fn stack_tags(&self, name: &str) -> Result<BTreeMap<String, String>, Error>;

    /// Physical ids of the stack's resources by logical id
    async fn stack_resources(&self, name: &str) -> Result<BTreeMap<String, String>, Error>;

    /// Stacks which haven't been deleted
    async fn list_stacks(&self) -> Result<Vec<StackSummary>, Error>;

    /// Template body the stack is currently deployed with
    async fn stack_template(&self, name: &str) -> Result<String, Error>;

    async fn create_stack(&self, request: CreateStack) -> Result<(), Error>;

    async fn update_stack(&self, request: UpdateStack) -> Result<(), Error>;

    async fn delete_stack(&self, name: &str) -> Result<(), Error>;
}
