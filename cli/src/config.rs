use crate::error::Error;
use crate::process;
use eyre::Context;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use stackformation_engine::placeholder;
use stackformation_engine::stack::{OnFailure, StackCache, StackParameter};
use stackformation_engine::{MergeError, Template, TemplateMerger, TemplateSet};
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "stacks.yml";

/// Contents of stacks.yml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    stacks: BTreeMap<String, StackConfig>,

    /// Directory the config was loaded from, templates are resolved against it
    #[serde(skip)]
    dir: PathBuf,
}

impl Config {
    /// Load the config from `path`, or from stacks.yml in the current directory
    pub fn load(path: Option<&Path>) -> eyre::Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()
                .wrap_err("Failed to get current dir")?
                .join(CONFIG_FILE),
        };

        let yaml = std::fs::read_to_string(&path)
            .inspect_err(|e| log::error!("Failed to read {path:?}: {e:?}"))
            .map_err(|_| {
                Error::new(
                    &format!("Config file {} not found", path.display()),
                    Some("Run the command in a directory with stacks.yml or pass --config"),
                )
            })?;

        let mut config = Self::parse(&yaml)
            .wrap_err_with(|| format!("Failed to parse {}", path.display()))?;

        config.dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(config)
    }

    pub fn parse(yaml: &str) -> eyre::Result<Self> {
        Ok(serde_saphyr::from_str(yaml)?)
    }

    pub fn stack(&self, name: &str) -> eyre::Result<Stack<'_>> {
        let (name, config) = self.stacks.get_key_value(name).ok_or_else(|| {
            Error::new(
                &format!("Stack '{name}' is not configured"),
                Some(&format!(
                    "Configured stacks: {}",
                    self.stacks.keys().cloned().collect::<Vec<_>>().join(", ")
                )),
            )
        })?;

        Ok(Stack {
            name: name.as_str(),
            config,
            dir: &self.dir,
        })
    }
}

/// Configuration of a single stack
#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    template: Templates,

    #[serde(default)]
    description: Option<String>,

    /// Null values keep the value from the previous deployment
    #[serde(default)]
    parameters: BTreeMap<String, Option<Value>>,

    #[serde(default)]
    tags: BTreeMap<String, String>,

    #[serde(default)]
    on_failure: Option<String>,

    /// Merged on top of the combined template
    #[serde(default)]
    extra: Option<Map<String, Value>>,
}

/// Template files of a stack
///
/// Files in a list are merged as is, files in a mapping get their logical ids
/// prefixed with the mapping key.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Templates {
    Single(PathBuf),
    List(Vec<PathBuf>),
    Named(NamedTemplates),
}

/// Mapping of prefix to template file, in the order of the config file
#[derive(Debug, Clone)]
struct NamedTemplates(Vec<(String, PathBuf)>);

impl<'de> Deserialize<'de> for NamedTemplates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamedVisitor;

        impl<'de> Visitor<'de> for NamedVisitor {
            type Value = NamedTemplates;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of prefixes to template files")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();

                while let Some(entry) = map.next_entry::<String, PathBuf>()? {
                    entries.push(entry);
                }

                Ok(NamedTemplates(entries))
            }
        }

        deserializer.deserialize_map(NamedVisitor)
    }
}

/// A configured stack, with paths resolved against the config file
pub struct Stack<'a> {
    pub name: &'a str,
    config: &'a StackConfig,
    dir: &'a Path,
}

impl<'a> Stack<'a> {
    /// Template files in the order they are merged, with the prefix of each
    ///
    /// Prefixes borrow from the config, so the list outlives this handle.
    pub fn template_files(&self) -> Vec<(Option<&'a str>, PathBuf)> {
        let config: &'a StackConfig = self.config;

        match &config.template {
            Templates::Single(path) => vec![(None, self.dir.join(path))],
            Templates::List(paths) => paths.iter().map(|p| (None, self.dir.join(p))).collect(),
            Templates::Named(NamedTemplates(entries)) => entries
                .iter()
                .map(|(prefix, p)| (Some(prefix.as_str()), self.dir.join(p)))
                .collect(),
        }
    }

    pub fn templates(&self) -> eyre::Result<TemplateSet> {
        let mut set = TemplateSet::new();

        for (prefix, path) in self.template_files() {
            let template = Template::from_path(&path)
                .inspect_err(|e| log::error!("Failed to read template {path:?}: {e:?}"))
                .map_err(|_| {
                    Error::new(
                        &format!("Template file '{}' not found", path.display()),
                        Some(&format!("Check the template of stack '{}' in stacks.yml", self.name)),
                    )
                })?;

            match prefix {
                Some(prefix) => set.insert(prefix, template),
                None => set.push(template),
            }
        }

        Ok(set)
    }

    /// Merge the stack's templates into the body sent to CloudFormation
    pub fn merged_template(&self) -> eyre::Result<String> {
        let templates = self.templates()?;

        let merged = TemplateMerger::new().merge(
            &templates,
            self.config.description.as_deref(),
            self.config.extra.as_ref(),
        );

        match merged {
            Ok(json) => Ok(json),

            Err(error) => {
                if let MergeError::InvalidJson { source_name, .. } = &error {
                    show_jq_diagnostics(Path::new(source_name));
                }

                Err(stackformation_engine::Error::from(error).into())
            }
        }
    }

    pub fn on_failure(&self) -> eyre::Result<OnFailure> {
        match &self.config.on_failure {
            Some(value) => Ok(value.parse()?),
            None => Ok(OnFailure::default()),
        }
    }

    /// Parameters with placeholders resolved
    pub async fn parameters(&self, cache: &mut StackCache<'_>) -> eyre::Result<Vec<StackParameter>> {
        let mut parameters = Vec::with_capacity(self.config.parameters.len());

        for (key, value) in &self.config.parameters {
            let value = match value {
                None | Some(Value::Null) => None,
                Some(Value::String(value)) => Some(placeholder::resolve(value, cache).await?),
                Some(value @ (Value::Number(_) | Value::Bool(_))) => Some(value.to_string()),
                Some(_) => eyre::bail!("Parameter '{key}' of stack '{}' must be a scalar", self.name),
            };

            parameters.push(StackParameter {
                key: key.clone(),
                value,
            });
        }

        Ok(parameters)
    }

    /// Tags with placeholders resolved
    pub async fn tags(&self, cache: &mut StackCache<'_>) -> eyre::Result<BTreeMap<String, String>> {
        let mut tags = BTreeMap::new();

        for (key, value) in &self.config.tags {
            tags.insert(key.clone(), placeholder::resolve(value, cache).await?);
        }

        Ok(tags)
    }
}

/// Let jq point at the syntax error, if it's installed
fn show_jq_diagnostics(path: &Path) {
    if !path.is_file() {
        return;
    }

    if !process::is_installed("jq") {
        log::debug!("jq is not installed, skipping JSON diagnostics");
        return;
    }

    if let Err(e) = process::passthru("jq", [OsStr::new("."), path.as_os_str()]) {
        log::error!("{e:?}");
    }
}
