mod extend;
mod merge;
mod rewrite;

pub use merge::{Key, TemplateMerger, TemplateSet};

use std::fmt;
use std::path::Path;

/// The only template format version CloudFormation accepts
pub const FORMAT_VERSION: &str = "2010-09-09";

/// Maximum size of a template body passed inline to CloudFormation
pub const MAX_TEMPLATE_SIZE: usize = 51200;

/// Default description when neither the templates nor the caller provide one
pub const DEFAULT_DESCRIPTION: &str = "Merged Template";

/// Top level sections combined across templates, in the order they are merged
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    Parameters,
    Mappings,
    Conditions,
    Resources,
    Outputs,
    Metadata,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Parameters,
        Section::Mappings,
        Section::Conditions,
        Section::Resources,
        Section::Outputs,
        Section::Metadata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Parameters => "Parameters",
            Section::Mappings => "Mappings",
            Section::Conditions => "Conditions",
            Section::Resources => "Resources",
            Section::Outputs => "Outputs",
            Section::Metadata => "Metadata",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single template file, as read from disk
///
/// The body is kept as text and decoded only when merged,
/// so decoding errors are reported against the key the template was merged under.
#[derive(Clone, Debug)]
pub struct Template {
    source: String,
    body: String,
}

impl Template {
    /// Template from an in-memory body, `source` is only used in error messages
    pub fn new(source: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            body: body.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)?;
        log::debug!("Loaded template {path:?} ({} bytes)", body.len());
        Ok(Self::new(path.display().to_string(), body))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}
