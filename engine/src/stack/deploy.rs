use super::{CreateStack, OnFailure, StackApi, StackParameter, StackStatus, UpdateStack};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Everything needed to bring a stack to the state of a template
#[derive(Clone, Debug)]
pub struct Deployment {
    pub name: String,
    pub template_body: String,
    pub parameters: Vec<StackParameter>,
    pub tags: BTreeMap<String, String>,
    pub on_failure: OnFailure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeployAction {
    Created,
    Updated,
}

impl Deployment {
    /// Create the stack, or update it if it already exists
    ///
    /// Tags and the on-failure policy are only applied when the stack is created.
    /// Deleted stacks are created anew.
    pub async fn run(self, api: &dyn StackApi) -> Result<DeployAction> {
        let status = api.stack_status(&self.name).await?;
        log::debug!("Status of {} before deployment: {status:?}", self.name);

        match status {
            Some(status) if !status.is_terminal() => Err(Error::StackBusy {
                stack: self.name,
                status: status.to_string(),
            }),

            Some(status) if status != StackStatus::DeleteComplete => {
                api.update_stack(UpdateStack {
                    name: self.name,
                    template_body: self.template_body,
                    parameters: self.parameters,
                })
                .await?;

                Ok(DeployAction::Updated)
            }

            _ => {
                api.create_stack(CreateStack {
                    name: self.name,
                    template_body: self.template_body,
                    parameters: self.parameters,
                    tags: self.tags,
                    on_failure: self.on_failure,
                })
                .await?;

                Ok(DeployAction::Created)
            }
        }
    }
}
