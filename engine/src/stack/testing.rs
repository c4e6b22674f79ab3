use super::{CreateStack, StackApi, StackEvent, StackStatus, StackSummary, UpdateStack};
use crate::error::Error;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Scripted in-memory stack API for a single stack
///
/// Statuses and event batches are handed out one per call, the last one repeats.
#[derive(Default)]
pub(crate) struct FakeApi {
    name: String,
    statuses: Vec<Option<StackStatus>>,
    events: Vec<Vec<StackEvent>>,
    outputs: BTreeMap<String, String>,
    parameters: BTreeMap<String, String>,
    resources: BTreeMap<String, String>,
    tags: BTreeMap<String, String>,
    failing: Option<&'static str>,
    calls: Mutex<HashMap<&'static str, usize>>,
    pub(crate) created: Mutex<Vec<CreateStack>>,
    pub(crate) updated: Mutex<Vec<UpdateStack>>,
}

/// Event of a stack resource, `seconds` after the epoch
pub(crate) fn event(id: &str, status: &str, seconds: i64) -> StackEvent {
    StackEvent {
        id: id.to_string(),
        timestamp: Utc.timestamp_opt(seconds, 0).unwrap(),
        status: StackStatus::from(status),
        resource_type: "AWS::S3::Bucket".to_string(),
        logical_resource_id: format!("Resource{id}"),
        reason: None,
    }
}

impl FakeApi {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn with_statuses(mut self, statuses: &[&str]) -> Self {
        self.statuses = statuses.iter().map(|s| Some(StackStatus::from(*s))).collect();
        self
    }

    /// The stack is no longer listed once the scripted statuses are used up
    pub(crate) fn then_gone(mut self) -> Self {
        self.statuses.push(None);
        self
    }

    /// Batches are returned as is, newest event first
    pub(crate) fn with_events(mut self, batches: Vec<Vec<StackEvent>>) -> Self {
        self.events = batches;
        self
    }

    pub(crate) fn with_output(mut self, key: &str, value: &str) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    pub(crate) fn with_parameter(mut self, key: &str, value: &str) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub(crate) fn with_resource(mut self, key: &str, value: &str) -> Self {
        self.resources.insert(key.into(), value.into());
        self
    }

    pub(crate) fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Make the named operation fail with an API error
    pub(crate) fn failing(mut self, operation: &'static str) -> Self {
        self.failing = Some(operation);
        self
    }

    pub(crate) fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or_default()
    }

    /// Count the call and return its position, fail if scripted to
    fn call(&self, operation: &'static str, stack: &str) -> Result<usize, Error> {
        let mut calls = self.calls.lock().unwrap();
        let count = calls.entry(operation).or_default();
        *count += 1;

        if self.failing == Some(operation) {
            return Err(eyre::eyre!("{operation} failed").into());
        }

        if !stack.is_empty() && stack != self.name {
            return Err(Error::StackNotFound(stack.to_string()));
        }

        Ok(*count - 1)
    }

    fn nth<T: Clone>(items: &[T], index: usize) -> Option<T> {
        items.get(index).or(items.last()).cloned()
    }
}

#[async_trait]
impl StackApi for FakeApi {
    async fn stack_status(&self, name: &str) -> Result<Option<StackStatus>, Error> {
        let index = self.call("stack_status", "")?;

        if name != self.name {
            return Ok(None);
        }

        Ok(Self::nth(&self.statuses, index).flatten())
    }

    async fn stack_events(&self, name: &str) -> Result<Vec<StackEvent>, Error> {
        let index = self.call("stack_events", name)?;
        Ok(Self::nth(&self.events, index).unwrap_or_default())
    }

    async fn stack_outputs(&self, name: &str) -> Result<BTreeMap<String, String>, Error> {
        self.call("stack_outputs", name)?;
        Ok(self.outputs.clone())
    }

    async fn stack_parameters(&self, name: &str) -> Result<BTreeMap<String, String>, Error> {
        self.call("stack_parameters", name)?;
        Ok(self.parameters.clone())
    }

    async fn stack_tags(&self, name: &str) -> Result<BTreeMap<String, String>, Error> {
        self.call("stack_tags", name)?;
        Ok(self.tags.clone())
    }

    async fn stack_resources(&self, name: &str) -> Result<BTreeMap<String, String>, Error> {
        self.call("stack_resources", name)?;
        Ok(self.resources.clone())
    }

    async fn list_stacks(&self) -> Result<Vec<StackSummary>, Error> {
        let index = self.call("list_stacks", "")?;

        Ok(Self::nth(&self.statuses, index)
            .flatten()
            .map(|status| StackSummary {
                name: self.name.clone(),
                status,
            })
            .into_iter()
            .collect())
    }

    async fn stack_template(&self, name: &str) -> Result<String, Error> {
        self.call("stack_template", name)?;
        Ok("{}".to_string())
    }

    async fn create_stack(&self, request: CreateStack) -> Result<(), Error> {
        self.call("create_stack", "")?;
        self.created.lock().unwrap().push(request);
        Ok(())
    }

    async fn update_stack(&self, request: UpdateStack) -> Result<(), Error> {
        self.call("update_stack", &request.name)?;
        self.updated.lock().unwrap().push(request);
        Ok(())
    }

    async fn delete_stack(&self, name: &str) -> Result<(), Error> {
        self.call("delete_stack", name)?;
        Ok(())
    }
}
