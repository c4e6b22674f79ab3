use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudformation::error::SdkError;
use aws_sdk_cloudformation::types::{self, Capability, Parameter, Tag};
use chrono::{DateTime, Utc};
use eyre::{ContextCompat, WrapErr};
use stackformation_engine::stack::{
    CreateStack, StackApi, StackEvent, StackParameter, StackStatus, StackSummary, UpdateStack,
};
use stackformation_engine::Error;
use std::collections::BTreeMap;

/// Stack operations backed by AWS CloudFormation
pub struct CloudFormation {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormation {
    /// Client for the default credential chain, optionally pinned to a region and profile
    pub async fn new(region: Option<&str>, profile: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }

        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }

        let config = loader.load().await;
        log::debug!("Using AWS region {:?}", config.region());

        Self {
            client: aws_sdk_cloudformation::Client::new(&config),
        }
    }

    /// Description of the stack, `None` if it doesn't exist
    async fn describe(&self, name: &str) -> Result<Option<types::Stack>, Error> {
        let result = self.client.describe_stacks().stack_name(name).send().await;

        match result {
            Ok(output) => Ok(output.stacks().first().cloned()),

            // CloudFormation reports missing stacks as a validation error
            Err(SdkError::ServiceError(err))
                if err.err().meta().code() == Some("ValidationError") =>
            {
                log::debug!("Stack {name} does not exist: {:?}", err.err().meta().message());
                Ok(None)
            }

            Err(e) => Err(eyre::Report::new(e)
                .wrap_err(format!("Failed to describe stack {name}"))
                .into()),
        }
    }

    async fn existing(&self, name: &str) -> Result<types::Stack, Error> {
        self.describe(name)
            .await?
            .ok_or_else(|| Error::StackNotFound(name.to_string()))
    }
}

fn parameters(parameters: Vec<StackParameter>) -> Vec<Parameter> {
    parameters
        .into_iter()
        .map(|parameter| {
            let builder = Parameter::builder().parameter_key(parameter.key);

            let builder = match parameter.value {
                Some(value) => builder.parameter_value(value),
                None => builder.use_previous_value(true),
            };

            builder.build()
        })
        .collect()
}

fn event(event: &types::StackEvent) -> eyre::Result<StackEvent> {
    let timestamp = event.timestamp().wrap_err("Missing event timestamp")?;

    Ok(StackEvent {
        id: event.event_id().wrap_err("Missing event id")?.to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
            .wrap_err("Event timestamp out of range")?,
        status: event
            .resource_status()
            .map(|status| StackStatus::from(status.as_str()))
            .wrap_err("Missing resource status")?,
        resource_type: event.resource_type().unwrap_or_default().to_string(),
        logical_resource_id: event.logical_resource_id().unwrap_or_default().to_string(),
        reason: event.resource_status_reason().map(str::to_string),
    })
}

/// Append the page's events up to the one that started the latest operation
///
/// Returns true once that event is found.
fn collect_current_operation(
    events: &mut Vec<StackEvent>,
    page: &[types::StackEvent],
) -> eyre::Result<bool> {
    for item in page {
        let item = event(item)?;
        let started = item.starts_operation();
        events.push(item);

        if started {
            return Ok(true);
        }
    }

    Ok(false)
}

#[async_trait]
impl StackApi for CloudFormation {
    async fn stack_status(&self, name: &str) -> Result<Option<StackStatus>, Error> {
        Ok(self.describe(name).await?.and_then(|stack| {
            stack
                .stack_status()
                .map(|status| StackStatus::from(status.as_str()))
        }))
    }

    async fn stack_events(&self, name: &str) -> Result<Vec<StackEvent>, Error> {
        let mut next_token = None;
        let mut events = Vec::new();

        loop {
            let response = self
                .client
                .describe_stack_events()
                .stack_name(name)
                .set_next_token(next_token)
                .send()
                .await
                .wrap_err_with(|| format!("Failed to describe events of stack {name}"))?;

            let started = collect_current_operation(&mut events, response.stack_events())?;
            next_token = response.next_token().map(str::to_string);

            // Older pages only hold previous operations
            if started || next_token.is_none() {
                break;
            }
        }

        log::debug!("Fetched {} events of stack {name}", events.len());
        Ok(events)
    }

    async fn stack_outputs(&self, name: &str) -> Result<BTreeMap<String, String>, Error> {
        Ok(self
            .existing(name)
            .await?
            .outputs()
            .iter()
            .filter_map(|output| {
                Some((
                    output.output_key()?.to_string(),
                    output.output_value().unwrap_or_default().to_string(),
                ))
            })
            .collect())
    }

    async fn stack_parameters(&self, name: &str) -> Result<BTreeMap<String, String>, Error> {
        Ok(self
            .existing(name)
            .await?
            .parameters()
            .iter()
            .filter_map(|parameter| {
                Some((
                    parameter.parameter_key()?.to_string(),
                    parameter.parameter_value().unwrap_or_default().to_string(),
                ))
            })
            .collect())
    }

    async fn stack_tags(&self, name: &str) -> Result<BTreeMap<String, String>, Error> {
        Ok(self
            .existing(name)
            .await?
            .tags()
            .iter()
            .filter_map(|tag| Some((tag.key()?.to_string(), tag.value()?.to_string())))
            .collect())
    }

    async fn stack_resources(&self, name: &str) -> Result<BTreeMap<String, String>, Error> {
        let response = self
            .client
            .describe_stack_resources()
            .stack_name(name)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to describe resources of stack {name}"))?;

        Ok(response
            .stack_resources()
            .iter()
            .filter_map(|resource| {
                Some((
                    resource.logical_resource_id()?.to_string(),
                    resource.physical_resource_id().unwrap_or_default().to_string(),
                ))
            })
            .collect())
    }

    async fn list_stacks(&self) -> Result<Vec<StackSummary>, Error> {
        let mut next_token = None;
        let mut stacks = Vec::new();

        loop {
            let response = self
                .client
                .list_stacks()
                .set_next_token(next_token)
                .send()
                .await
                .wrap_err("Failed to list stacks")?;

            for summary in response.stack_summaries() {
                let status = summary
                    .stack_status()
                    .map(|status| StackStatus::from(status.as_str()))
                    .wrap_err("Missing stack status")?;

                if status == StackStatus::DeleteComplete {
                    continue;
                }

                stacks.push(StackSummary {
                    name: summary.stack_name().unwrap_or_default().to_string(),
                    status,
                });
            }

            next_token = response.next_token().map(str::to_string);

            if next_token.is_none() {
                break;
            }
        }

        stacks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stacks)
    }

    async fn stack_template(&self, name: &str) -> Result<String, Error> {
        let response = self
            .client
            .get_template()
            .stack_name(name)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to get template of stack {name}"))?;

        Ok(response.template_body().unwrap_or_default().to_string())
    }

    async fn create_stack(&self, request: CreateStack) -> Result<(), Error> {
        log::debug!("Creating stack {}", request.name);

        let tags = request
            .tags
            .into_iter()
            .map(|(key, value)| Tag::builder().key(key).value(value).build())
            .collect();

        self.client
            .create_stack()
            .stack_name(&request.name)
            .template_body(request.template_body)
            .capabilities(Capability::CapabilityIam)
            .set_parameters(Some(parameters(request.parameters)))
            .set_tags(Some(tags))
            .on_failure(types::OnFailure::from(request.on_failure.as_str()))
            .send()
            .await
            .wrap_err_with(|| format!("Failed to create stack {}", request.name))?;

        Ok(())
    }

    async fn update_stack(&self, request: UpdateStack) -> Result<(), Error> {
        log::debug!("Updating stack {}", request.name);

        self.client
            .update_stack()
            .stack_name(&request.name)
            .template_body(request.template_body)
            .capabilities(Capability::CapabilityIam)
            .set_parameters(Some(parameters(request.parameters)))
            .send()
            .await
            .wrap_err_with(|| format!("Failed to update stack {}", request.name))?;

        Ok(())
    }

    async fn delete_stack(&self, name: &str) -> Result<(), Error> {
        log::debug!("Deleting stack {name}");

        self.client
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to delete stack {name}"))?;

        Ok(())
    }
}
