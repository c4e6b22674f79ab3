pub mod error;
pub mod observer;
pub mod placeholder;
pub mod stack;
pub mod template;

pub use error::{Error, MergeError, Result};
pub use observer::{EventSink, Observation, Observer, Outcome};
pub use template::{Template, TemplateMerger, TemplateSet};
