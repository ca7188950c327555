use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;
use crate::logging::LogLevel;
use crate::providers::CiProvider;

/// Scriptable provider for testing without a CI platform.
///
/// Facts are set with the builder-style `with_*` methods; callbacks are
/// recorded for later assertions.
pub struct MockProvider {
    name: &'static str,
    active: bool,
    branch: String,
    commit_message_short: String,
    commit_message_extended: String,
    build_version: String,
    pull_request: bool,
    reported_versions: Mutex<Vec<String>>,
    messages: Mutex<Vec<(LogLevel, String)>>,
    artifacts: Mutex<Vec<PathBuf>>,
    test_results: Mutex<Vec<(PathBuf, String)>>,
}

impl MockProvider {
    pub fn new(name: &'static str) -> Self {
        MockProvider {
            name,
            active: false,
            branch: String::new(),
            commit_message_short: String::new(),
            commit_message_extended: String::new(),
            build_version: String::new(),
            pull_request: false,
            reported_versions: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            artifacts: Mutex::new(Vec::new()),
            test_results: Mutex::new(Vec::new()),
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_commit_message(mut self, short: impl Into<String>) -> Self {
        self.commit_message_short = short.into();
        self
    }

    pub fn with_extended_message(mut self, extended: impl Into<String>) -> Self {
        self.commit_message_extended = extended.into();
        self
    }

    pub fn with_build_version(mut self, version: impl Into<String>) -> Self {
        self.build_version = version.into();
        self
    }

    pub fn with_pull_request(mut self, pull_request: bool) -> Self {
        self.pull_request = pull_request;
        self
    }

    /// Versions pushed back through [CiProvider::update_build_version].
    pub fn reported_versions(&self) -> Vec<String> {
        self.reported_versions.lock().unwrap().clone()
    }

    /// Messages surfaced through [CiProvider::report_message].
    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        self.messages.lock().unwrap().clone()
    }

    /// Artifacts uploaded through [CiProvider::upload_artifact].
    pub fn artifacts(&self) -> Vec<PathBuf> {
        self.artifacts.lock().unwrap().clone()
    }

    /// Test-results files uploaded through [CiProvider::upload_test_results].
    pub fn test_results(&self) -> Vec<(PathBuf, String)> {
        self.test_results.lock().unwrap().clone()
    }
}

impl CiProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn branch(&self) -> String {
        self.branch.clone()
    }

    fn commit_message_short(&self) -> String {
        self.commit_message_short.clone()
    }

    fn commit_message_extended(&self) -> String {
        self.commit_message_extended.clone()
    }

    fn reported_build_version(&self) -> String {
        self.build_version.clone()
    }

    fn is_pull_request(&self) -> bool {
        self.pull_request
    }

    fn update_build_version(&self, version: &str) -> Result<()> {
        self.reported_versions.lock().unwrap().push(version.to_string());
        Ok(())
    }

    fn report_message(&self, level: LogLevel, message: &str) -> Result<()> {
        self.messages.lock().unwrap().push((level, message.to_string()));
        Ok(())
    }

    fn upload_artifact(&self, path: &Path) -> Result<()> {
        self.artifacts.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn upload_test_results(&self, path: &Path, format: &str) -> Result<()> {
        self.test_results
            .lock()
            .unwrap()
            .push((path.to_path_buf(), format.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_defaults() {
        let p = MockProvider::new("AppVeyor");
        assert_eq!(p.name(), "AppVeyor");
        assert!(!p.is_active());
        assert_eq!(p.branch(), "");
        assert!(!p.is_pull_request());
    }

    #[test]
    fn test_mock_provider_builder() {
        let p = MockProvider::new("AppVeyor")
            .with_active(true)
            .with_branch("someFeature")
            .with_build_version("2.3.4")
            .with_extended_message("[deploy uat4]")
            .with_pull_request(true);
        assert!(p.is_active());
        assert_eq!(p.branch(), "someFeature");
        assert_eq!(p.reported_build_version(), "2.3.4");
        assert_eq!(p.commit_message_extended(), "[deploy uat4]");
        assert!(p.is_pull_request());
    }

    #[test]
    fn test_mock_provider_records_callbacks() {
        let p = MockProvider::new("AppVeyor");
        p.update_build_version("2.3.4-x").unwrap();
        p.report_message(LogLevel::Information, "hello").unwrap();
        p.upload_artifact(Path::new("Artifacts/pkg.nupkg")).unwrap();
        p.upload_test_results(Path::new("TestResult.xml"), "nunit3")
            .unwrap();

        assert_eq!(p.reported_versions(), vec!["2.3.4-x".to_string()]);
        assert_eq!(p.messages().len(), 1);
        assert_eq!(p.artifacts(), vec![PathBuf::from("Artifacts/pkg.nupkg")]);
        assert_eq!(
            p.test_results(),
            vec![(PathBuf::from("TestResult.xml"), "nunit3".to_string())]
        );
    }
}
