use super::StackApi;
use crate::error::{Error, Result};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Lookup {
    Parameters,
    Outputs,
    Resources,
    Tags,
}

impl Lookup {
    fn what(&self) -> &'static str {
        match self {
            Lookup::Parameters => "Parameter",
            Lookup::Outputs => "Output",
            Lookup::Resources => "Resource",
            Lookup::Tags => "Tag",
        }
    }
}

/// Memoized lookups of stack attributes
///
/// Each stack is fetched at most once per kind of lookup. The cache is never invalidated,
/// create a new one for every command so values don't outlive a deployment.
pub struct StackCache<'a> {
    api: &'a dyn StackApi,
    entries: HashMap<(Lookup, String), BTreeMap<String, String>>,
}

impl<'a> StackCache<'a> {
    pub fn new(api: &'a dyn StackApi) -> Self {
        Self {
            api,
            entries: HashMap::new(),
        }
    }

    pub async fn parameters(&mut self, stack: &str) -> Result<&BTreeMap<String, String>> {
        self.all(Lookup::Parameters, stack).await
    }

    pub async fn parameter(&mut self, stack: &str, key: &str) -> Result<String> {
        self.get(Lookup::Parameters, stack, key).await
    }

    pub async fn outputs(&mut self, stack: &str) -> Result<&BTreeMap<String, String>> {
        self.all(Lookup::Outputs, stack).await
    }

    pub async fn output(&mut self, stack: &str, key: &str) -> Result<String> {
        self.get(Lookup::Outputs, stack, key).await
    }

    /// Physical resource ids by logical id
    pub async fn resources(&mut self, stack: &str) -> Result<&BTreeMap<String, String>> {
        self.all(Lookup::Resources, stack).await
    }

    pub async fn resource(&mut self, stack: &str, logical_id: &str) -> Result<String> {
        self.get(Lookup::Resources, stack, logical_id).await
    }

    pub async fn tags(&mut self, stack: &str) -> Result<&BTreeMap<String, String>> {
        self.all(Lookup::Tags, stack).await
    }

    pub async fn tag(&mut self, stack: &str, key: &str) -> Result<String> {
        self.get(Lookup::Tags, stack, key).await
    }

    async fn get(&mut self, lookup: Lookup, stack: &str, key: &str) -> Result<String> {
        self.all(lookup, stack)
            .await?
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound {
                what: lookup.what(),
                stack: stack.to_string(),
                key: key.to_string(),
            })
    }

    async fn all(&mut self, lookup: Lookup, stack: &str) -> Result<&BTreeMap<String, String>> {
        let api = self.api;

        match self.entries.entry((lookup, stack.to_string())) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),

            Entry::Vacant(entry) => {
                log::debug!("Fetching {lookup:?} of stack {stack}");

                let values = match lookup {
                    Lookup::Parameters => api.stack_parameters(stack).await?,
                    Lookup::Outputs => api.stack_outputs(stack).await?,
                    Lookup::Resources => api.stack_resources(stack).await?,
                    Lookup::Tags => api.stack_tags(stack).await?,
                };

                Ok(entry.insert(values))
            }
        }
    }
}
