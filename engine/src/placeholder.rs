//! Placeholders in parameter and tag values
//!
//! - `{env:NAME}`: environment variable
//! - `{output:stack:key}`: output of another stack
//! - `{resource:stack:logicalId}`: physical id of another stack's resource
//! - `{parameter:stack:key}`: parameter of another stack

use crate::error::{Error, Result};
use crate::stack::StackCache;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENV: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{env:(.*?)\}").unwrap());
static OUTPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{output:(.*?):(.*?)\}").unwrap());
static RESOURCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{resource:(.*?):(.*?)\}").unwrap());
static PARAMETER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{parameter:(.*?):(.*?)\}").unwrap());

#[derive(Clone, Copy)]
enum Lookup {
    Output,
    Resource,
    Parameter,
}

/// Replace all placeholders in `value`
///
/// Environment variables are substituted first, so they can be used
/// to pick the stack a lookup refers to.
pub async fn resolve(value: &str, cache: &mut StackCache<'_>) -> Result<String> {
    let mut value = resolve_env(value)?;

    for (regex, lookup) in [
        (&*OUTPUT, Lookup::Output),
        (&*RESOURCE, Lookup::Resource),
        (&*PARAMETER, Lookup::Parameter),
    ] {
        value = resolve_lookups(&value, regex, lookup, cache).await?;
    }

    Ok(value)
}

/// Replace `{env:NAME}` placeholders, unset and empty variables are an error
pub fn resolve_env(value: &str) -> Result<String> {
    replace(value, &ENV, |captures| {
        let name = &captures[1];

        match std::env::var(name) {
            Ok(var) if !var.is_empty() => Ok(var),
            _ => Err(Error::EnvVarNotFound(name.to_string())),
        }
    })
}

async fn resolve_lookups(
    value: &str,
    regex: &Regex,
    lookup: Lookup,
    cache: &mut StackCache<'_>,
) -> Result<String> {
    let mut resolved = String::with_capacity(value.len());
    let mut last = 0;

    for captures in regex.captures_iter(value) {
        let Some(placeholder) = captures.get(0) else {
            continue;
        };

        let (stack, key) = (&captures[1], &captures[2]);

        let replacement = match lookup {
            Lookup::Output => cache.output(stack, key).await?,
            Lookup::Resource => cache.resource(stack, key).await?,
            Lookup::Parameter => cache.parameter(stack, key).await?,
        };

        resolved.push_str(&value[last..placeholder.start()]);
        resolved.push_str(&replacement);
        last = placeholder.end();
    }

    resolved.push_str(&value[last..]);
    Ok(resolved)
}

fn replace(
    value: &str,
    regex: &Regex,
    mut replacement: impl FnMut(&Captures) -> Result<String>,
) -> Result<String> {
    let mut resolved = String::with_capacity(value.len());
    let mut last = 0;

    for captures in regex.captures_iter(value) {
        let Some(placeholder) = captures.get(0) else {
            continue;
        };

        resolved.push_str(&value[last..placeholder.start()]);
        resolved.push_str(&replacement(&captures)?);
        last = placeholder.end();
    }

    resolved.push_str(&value[last..]);
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::{resolve, resolve_env};
    use crate::error::Error;
    use crate::stack::testing::FakeApi;
    use crate::stack::StackCache;

    #[test]
    fn env() {
        temp_env::with_var("STACKFORMATION_TEST_ENV", Some("prod"), || {
            assert_eq!(
                resolve_env("app-{env:STACKFORMATION_TEST_ENV}-db").unwrap(),
                "app-prod-db"
            );
        });
    }

    #[test]
    fn missing_env() {
        temp_env::with_var_unset("STACKFORMATION_TEST_MISSING", || {
            assert!(matches!(
                resolve_env("{env:STACKFORMATION_TEST_MISSING}"),
                Err(Error::EnvVarNotFound(ref name)) if name == "STACKFORMATION_TEST_MISSING"
            ));
        });
    }

    #[tokio::test]
    async fn stack_lookups() {
        let api = FakeApi::new("net")
            .with_output("VpcId", "vpc-123")
            .with_resource("Subnet", "subnet-456")
            .with_parameter("Env", "prod");

        let mut cache = StackCache::new(&api);

        let value = resolve(
            "{output:net:VpcId}/{resource:net:Subnet}/{parameter:net:Env}/{output:net:VpcId}",
            &mut cache,
        )
        .await
        .unwrap();

        assert_eq!(value, "vpc-123/subnet-456/prod/vpc-123");
        assert_eq!(api.calls("stack_outputs"), 1);
    }

    #[tokio::test]
    async fn plain_values_are_untouched() {
        let api = FakeApi::new("net");
        let mut cache = StackCache::new(&api);

        assert_eq!(resolve("t3.micro", &mut cache).await.unwrap(), "t3.micro");
        assert_eq!(api.calls("stack_outputs"), 0);
    }

    #[tokio::test]
    async fn unknown_output() {
        let api = FakeApi::new("net");
        let mut cache = StackCache::new(&api);

        assert!(matches!(
            resolve("{output:net:Missing}", &mut cache).await,
            Err(Error::NotFound { what: "Output", .. })
        ));
    }
}
