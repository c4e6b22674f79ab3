use super::StackStatus;
use chrono::{DateTime, Utc};

/// One entry of a stack's event log
#[derive(Clone, Debug, PartialEq)]
pub struct StackEvent {
    /// Unique across the stack's history
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub status: StackStatus,
    pub resource_type: String,
    pub logical_resource_id: String,
    pub reason: Option<String>,
}

/// Resource type of the events about the stack itself
pub const STACK_RESOURCE_TYPE: &str = "AWS::CloudFormation::Stack";

impl StackEvent {
    /// First event of an operation started by a user, e.g. a create or an update
    ///
    /// Everything older belongs to previous operations.
    pub fn starts_operation(&self) -> bool {
        self.resource_type == STACK_RESOURCE_TYPE && self.reason.as_deref() == Some("User Initiated")
    }
}
