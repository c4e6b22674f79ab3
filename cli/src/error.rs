/// Error shown to the user: a message and an optional hint on what to do about it
#[derive(Debug)]
pub struct Error(String, Option<String>);

impl Error {
    pub fn new(message: &str, details: Option<&str>) -> Self {
        Error(message.to_string(), details.map(|d| d.to_string()))
    }
}

/// Display the message and details, as sort of a hint
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.1 {
            Some(details) => write!(f, "{}\n\n{}", self.0, console::style(details).dim()),
            None => write!(f, "{}", self.0),
        }
    }
}

impl std::error::Error for Error {}

/// Turn an engine failure into a message with a hint
impl From<stackformation_engine::Error> for Error {
    fn from(error: stackformation_engine::Error) -> Self {
        use stackformation_engine::{Error as EngineError, MergeError};

        let hint = match &error {
            EngineError::Merge(MergeError::DuplicateKey { .. }) => {
                Some("Merge the templates under named keys in stacks.yml to prefix their logical ids")
            }
            EngineError::Merge(MergeError::TooLarge { .. }) => {
                Some("Split the stack or move large blocks like inline code out of the template")
            }
            EngineError::Merge(MergeError::InvalidJson { .. }) => {
                Some("Fix the JSON syntax of the template and try again")
            }
            EngineError::StackNotFound(_) => Some("Check the stack name and the AWS region"),
            EngineError::StackBusy { .. } => Some("Wait for the running operation to finish"),
            EngineError::EnvVarNotFound(_) => Some("Export the variable before running the command"),
            EngineError::InvalidOnFailure(_) => Some("Check on_failure of the stack in stacks.yml"),
            EngineError::NotFound { .. } => Some("Check the placeholders in stacks.yml"),
            EngineError::Cancelled => {
                Some("The stack operation goes on, use `stackformation stack observe` to follow it")
            }
            EngineError::Api(_) => Some("Check your AWS credentials and region, then try again"),
            _ => None,
        };

        log::error!("{error:?}");
        Error::new(&format!("{error:#}"), hint)
    }
}

/// Errors from the command internals, the origin is only logged
impl From<eyre::ErrReport> for Error {
    fn from(error: eyre::ErrReport) -> Self {
        match error.downcast::<Error>() {
            Ok(error) => error,

            Err(error) => match error.downcast::<stackformation_engine::Error>() {
                Ok(error) => error.into(),

                Err(error) => {
                    log::error!("{error:?}");
                    Error::new(&format!("{error:#}"), None)
                }
            },
        }
    }
}
