//! Commit-message deployment directives
//!
//! A commit's extended message can carry an embedded instruction of the
//! form `[deploy uat4]`: a bracketed command word followed by a target
//! token. The parser is compiled once per context from the configured
//! command words and never mutated afterwards.

use regex::Regex;

use crate::config::VersionConfig;
use crate::error::{CiVersionError, Result};

/// Outcome of matching a commit message against the directive pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveMatch {
    /// Whether a directive was found.
    pub success: bool,
    /// The command word as written in the message.
    pub command: String,
    /// The target token as written in the message.
    pub argument: String,
}

impl DirectiveMatch {
    /// The no-match result.
    pub fn none() -> Self {
        DirectiveMatch::default()
    }
}

/// Compiled matcher for deployment directives.
pub struct DirectiveParser {
    regex: Regex,
}

impl DirectiveParser {
    /// Build a parser from configured command words.
    ///
    /// Words must already be validated ([VersionConfig::validate]); they are
    /// joined into a case-insensitive alternation. The target is one or more
    /// word characters or dots, brackets are mandatory, and extra internal
    /// whitespace between command and target is tolerated.
    pub fn new(commands: &[String]) -> Result<Self> {
        if commands.is_empty() {
            return Err(CiVersionError::config(
                "Cannot build a directive parser without command words",
            ));
        }
        let pattern = format!(
            r"(?i)\[(?P<command>{})\s+(?P<argument>[\w.]+)\]+",
            commands.join("|")
        );
        let regex = Regex::new(&pattern)
            .map_err(|e| CiVersionError::config(format!("Invalid directive pattern: {}", e)))?;
        Ok(DirectiveParser { regex })
    }

    /// Parser for a configuration's command words.
    pub fn from_config(config: &VersionConfig) -> Result<Self> {
        Self::new(&config.deploy_commands)
    }

    /// Match a message against the pattern. Only the first match counts.
    pub fn parse(&self, message: &str) -> DirectiveMatch {
        match self.regex.captures(message) {
            Some(caps) => DirectiveMatch {
                success: true,
                command: caps["command"].to_string(),
                argument: caps["argument"].to_string(),
            },
            None => DirectiveMatch::none(),
        }
    }
}
