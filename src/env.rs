//! Environment-variable and build-argument accessors
//!
//! The build host owns the real process environment and the parsed script
//! arguments; the context only sees them through these traits. Fake
//! implementations are provided for tests, mirroring the trait + fake
//! split used elsewhere in the crate.

use std::collections::HashMap;

/// Read access to environment variables.
pub trait Environment: Send + Sync {
    /// Value of a variable, or `None` when it is not set.
    fn get(&self, name: &str) -> Option<String>;

    /// Snapshot of all variables.
    fn vars(&self) -> HashMap<String, String>;

    /// Value of a variable, trimmed, with blank values treated as unset.
    fn get_non_blank(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Read access to named build arguments (e.g. `buildVersion=2.3.4`).
pub trait Arguments: Send + Sync {
    /// Value of an argument, or `None` when it was not supplied.
    fn get(&self, name: &str) -> Option<String>;

    /// Whether an argument was supplied at all.
    fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// [Environment] backed by the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars().collect()
    }
}

/// [Arguments] backed by a list of `key=value` pairs.
#[derive(Debug, Default, Clone)]
pub struct ArgList {
    values: HashMap<String, String>,
}

impl ArgList {
    pub fn new() -> Self {
        ArgList {
            values: HashMap::new(),
        }
    }

    /// Parse `key=value` pairs; entries without `=` become flags with an
    /// empty value (present but blank, like `--verbosity`).
    pub fn parse<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = HashMap::new();
        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((key, value)) => values.insert(key.to_string(), value.to_string()),
                None => values.insert(pair.to_string(), String::new()),
            };
        }
        ArgList { values }
    }

    /// Add or replace a single argument.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl Arguments for ArgList {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// In-memory [Environment] for tests.
#[derive(Debug, Default, Clone)]
pub struct FakeEnvironment {
    vars: HashMap<String, String>,
}

impl FakeEnvironment {
    pub fn new() -> Self {
        FakeEnvironment {
            vars: HashMap::new(),
        }
    }

    /// Builder-style variable assignment.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl Environment for FakeEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.vars.clone()
    }
}

/// In-memory [Arguments] for tests.
#[derive(Debug, Default, Clone)]
pub struct FakeArguments {
    values: HashMap<String, String>,
}

impl FakeArguments {
    pub fn new() -> Self {
        FakeArguments {
            values: HashMap::new(),
        }
    }

    /// Builder-style argument assignment.
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl Arguments for FakeArguments {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
