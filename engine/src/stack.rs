mod api;
mod cache;
mod deploy;
mod event;
mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{CreateStack, OnFailure, StackApi, StackParameter, StackSummary, UpdateStack};
pub use cache::StackCache;
pub use deploy::{DeployAction, Deployment};
pub use event::StackEvent;
pub use status::{StackStatus, StatusStyle};
