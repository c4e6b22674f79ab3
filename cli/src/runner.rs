use crate::cloud::CloudFormation;
use crate::config::Config;
use crate::error::Error;
use std::error::Error as StdError;
use std::path::PathBuf;

/// Options shared by all commands
#[derive(Clone, Default)]
pub(crate) struct Context {
    pub(crate) config: Option<PathBuf>,
    pub(crate) region: Option<String>,
    pub(crate) profile: Option<String>,
}

pub(crate) trait Runner {
    fn context(&self) -> &Context;

    /// Stacks configured in stacks.yml
    fn config(&self) -> Result<Config, Error> {
        Ok(Config::load(self.context().config.as_deref())?)
    }

    /// CloudFormation client for the region and profile picked on the command line
    async fn cloud(&self) -> CloudFormation {
        let context = self.context();
        CloudFormation::new(context.region.as_deref(), context.profile.as_deref()).await
    }

    /// Run the command
    ///
    /// Returns an error shown to the user in case of failure
    async fn run(&mut self) -> Result<(), Error>;

    /// Construct an error shown to the user
    fn error(
        &self,
        title: Option<&str>,
        description: Option<&str>,
        origin: Option<Box<dyn StdError>>,
    ) -> Error {
        if let Some(origin) = origin {
            log::error!("{origin:?}");
        }

        if let Some(title) = title {
            Error::new(title, description)
        } else {
            Error::new("Failed to run the command", Some("Run again with --verbose for details"))
        }
    }
}

/// Return a runner for a command
pub(crate) trait Runnable {
    fn runner(&self, context: &Context) -> impl Runner;
}
