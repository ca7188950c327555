//! TeamCity agent facade
//!
//! Detection is via the `TEAMCITY_VERSION` environment variable. All
//! callbacks are service messages written to stdout, which the agent parses
//! (`##teamcity[...]`). The agent does not expose branch or commit metadata
//! through plain environment variables, so those accessors return empty and
//! the version base comes from dedicated variables instead (see the
//! resolution chain in [crate::version]).

use std::path::Path;
use std::sync::Arc;

use crate::env::Environment;
use crate::error::Result;
use crate::logging::LogLevel;
use crate::providers::CiProvider;

pub struct TeamCityProvider {
    env: Arc<dyn Environment>,
}

impl TeamCityProvider {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        TeamCityProvider { env }
    }
}

/// Escape a value for inclusion in a TeamCity service message.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '|' => out.push_str("||"),
            '\'' => out.push_str("|'"),
            '[' => out.push_str("|["),
            ']' => out.push_str("|]"),
            '\n' => out.push_str("|n"),
            '\r' => out.push_str("|r"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a service message with named attributes.
fn service_message(name: &str, attributes: &[(&str, &str)]) -> String {
    let mut msg = format!("##teamcity[{}", name);
    for (key, value) in attributes {
        msg.push_str(&format!(" {}='{}'", key, escape(value)));
    }
    msg.push(']');
    msg
}

impl CiProvider for TeamCityProvider {
    fn name(&self) -> &'static str {
        "TeamCity"
    }

    fn is_active(&self) -> bool {
        self.env.get_non_blank("TEAMCITY_VERSION").is_some()
    }

    fn branch(&self) -> String {
        String::new()
    }

    fn commit_message_short(&self) -> String {
        String::new()
    }

    fn commit_message_extended(&self) -> String {
        String::new()
    }

    fn reported_build_version(&self) -> String {
        String::new()
    }

    fn is_pull_request(&self) -> bool {
        false
    }

    fn update_build_version(&self, version: &str) -> Result<()> {
        // buildNumber takes a bare value, not named attributes
        println!("##teamcity[buildNumber '{}']", escape(version));
        Ok(())
    }

    fn report_message(&self, level: LogLevel, message: &str) -> Result<()> {
        let status = match level {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARNING",
            _ => "NORMAL",
        };
        println!(
            "{}",
            service_message("message", &[("text", message), ("status", status)])
        );
        Ok(())
    }

    fn upload_artifact(&self, path: &Path) -> Result<()> {
        println!(
            "{}",
            service_message("publishArtifacts", &[("path", &path.to_string_lossy())])
        );
        Ok(())
    }

    fn upload_test_results(&self, path: &Path, format: &str) -> Result<()> {
        println!(
            "{}",
            service_message(
                "importData",
                &[("type", format), ("path", &path.to_string_lossy())]
            )
        );
        Ok(())
    }
}
