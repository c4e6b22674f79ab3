use super::extend::extend;
use super::rewrite::prefix_document;
use super::{Section, Template, DEFAULT_DESCRIPTION, FORMAT_VERSION, MAX_TEMPLATE_SIZE};
use crate::error::MergeError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Key a template is merged under
///
/// Named keys become the namespace prefix of every logical id in the template,
/// positional keys leave the ids as they are.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    Index(usize),
    Named(String),
}

impl Key {
    pub fn prefix(&self) -> &str {
        match self {
            Key::Index(_) => "",
            Key::Named(name) => name,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{index}"),
            Key::Named(name) => f.write_str(name),
        }
    }
}

/// Ordered collection of templates to merge
#[derive(Clone, Debug, Default)]
pub struct TemplateSet {
    entries: Vec<(Key, Template)>,
}

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Templates merged without prefixes
    pub fn list(templates: impl IntoIterator<Item = Template>) -> Self {
        let mut set = Self::new();

        for template in templates {
            set.push(template);
        }

        set
    }

    /// Append a template under the next positional key
    pub fn push(&mut self, template: Template) {
        let index = self.entries.len();
        self.entries.push((Key::Index(index), template));
    }

    /// Append a template whose logical ids get prefixed with `prefix`
    pub fn insert(&mut self, prefix: impl Into<String>, template: Template) {
        self.entries.push((Key::Named(prefix.into()), template));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Key, Template)> {
        self.entries.iter()
    }
}

/// Combines several templates into one deployable template
#[derive(Clone, Debug)]
pub struct TemplateMerger {
    size_limit: usize,
}

impl Default for TemplateMerger {
    fn default() -> Self {
        Self {
            size_limit: MAX_TEMPLATE_SIZE,
        }
    }
}

impl TemplateMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the maximum size of the serialized template
    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Merge the templates into a single JSON document
    ///
    /// `description` takes precedence over the descriptions of the templates,
    /// `extra` is merged recursively on top of the result.
    pub fn merge(
        &self,
        templates: &TemplateSet,
        description: Option<&str>,
        extra: Option<&Map<String, Value>>,
    ) -> Result<String, MergeError> {
        if templates.is_empty() {
            return Err(MergeError::NoTemplates);
        }

        let mut merged = Map::new();

        merged.insert(
            "AWSTemplateFormatVersion".into(),
            Value::String(FORMAT_VERSION.into()),
        );

        let mut description = description
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let is_single = templates.len() == 1;
        let mut sections: [Option<Map<String, Value>>; Section::ALL.len()] = Default::default();

        for (key, template) in templates.iter() {
            let prefix = key.prefix();
            log::debug!("Merging {} under key {key:?}", template.source());
            let mut document = decode(key, template)?;

            prefix_document(&mut document, prefix);

            match document.get("AWSTemplateFormatVersion") {
                Some(Value::String(version)) if version == FORMAT_VERSION => {}
                found => {
                    return Err(MergeError::InvalidFormatVersion {
                        source_name: template.source().to_string(),
                        found: found.map(|v| match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        }),
                    })
                }
            }

            if let Some(text) = document.get("Description").filter(|d| !is_empty(d)) {
                if is_single && description.is_none() {
                    description = text.as_str().map(str::to_string);
                }

                merged.insert("Description".into(), text.clone());
            }

            for (section, merged_section) in Section::ALL.iter().zip(sections.iter_mut()) {
                let Some(Value::Object(entries)) = document.get_mut(section.as_str()) else {
                    continue;
                };

                let target = merged_section.get_or_insert_with(Map::new);
                insert_section(target, *section, prefix, std::mem::take(entries))?;
            }
        }

        for (section, entries) in Section::ALL.iter().zip(sections) {
            if let Some(entries) = entries {
                merged.insert(section.as_str().into(), Value::Object(entries));
            }
        }

        if let Some(description) = description {
            merged.insert("Description".into(), Value::String(description.trim().into()));
        }

        if merged.get("Description").is_none_or(is_empty) {
            merged.insert("Description".into(), Value::String(DEFAULT_DESCRIPTION.into()));
        }

        if let Some(extra) = extra {
            extend(&mut merged, extra);
        }

        self.serialize(&Value::Object(merged))
    }

    /// Pretty print the template, falling back to compact output when over the size limit
    fn serialize(&self, template: &Value) -> Result<String, MergeError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        template.serialize(&mut serializer)?;

        let json = String::from_utf8_lossy(&buffer).into_owned();

        if json.len() <= self.size_limit {
            return Ok(json);
        }

        log::debug!(
            "Pretty template is {} bytes, over the limit of {}, trying compact output",
            json.len(),
            self.size_limit
        );

        let json = serde_json::to_string(template)?;

        if json.len() > self.size_limit {
            return Err(MergeError::TooLarge {
                size: json.len(),
                limit: self.size_limit,
            });
        }

        Ok(json)
    }
}

fn decode(key: &Key, template: &Template) -> Result<Map<String, Value>, MergeError> {
    let invalid = |reason: String, line: usize, column: usize| MergeError::InvalidJson {
        source_name: template.source().to_string(),
        key: key.to_string(),
        reason,
        line,
        column,
    };

    match serde_json::from_str::<Value>(template.body()) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err(invalid("template is not a JSON object".into(), 1, 1)),
        Err(e) => Err(invalid(e.to_string(), e.line(), e.column())),
    }
}

fn insert_section(
    target: &mut Map<String, Value>,
    section: Section,
    prefix: &str,
    entries: Map<String, Value>,
) -> Result<(), MergeError> {
    for (id, value) in entries {
        let id = format!("{prefix}{id}");

        if let Some(existing) = target.get(&id) {
            // Templates may share a parameter as long as they agree on its type
            if section == Section::Parameters && existing.get("Type") == value.get("Type") {
                log::debug!("Parameter {id} is declared more than once with the same type");
                continue;
            }

            return Err(MergeError::DuplicateKey {
                key: id,
                section: section.to_string(),
            });
        }

        target.insert(id, value);
    }

    Ok(())
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}
