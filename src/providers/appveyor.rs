//! AppVeyor build-worker facade
//!
//! Facts come from the `APPVEYOR_*` environment variables the worker sets;
//! callbacks go through the `appveyor` build-worker CLI, except test-result
//! uploads which use the documented job results endpoint.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use crate::env::Environment;
use crate::error::{CiVersionError, Result};
use crate::logging::LogLevel;
use crate::providers::CiProvider;

pub struct AppVeyorProvider {
    env: Arc<dyn Environment>,
}

impl AppVeyorProvider {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        AppVeyorProvider { env }
    }

    fn var(&self, name: &str) -> String {
        self.env.get(name).unwrap_or_default()
    }

    fn run_worker_cli(&self, args: &[&str]) -> Result<()> {
        let status = Command::new("appveyor")
            .args(args)
            .status()
            .map_err(|e| CiVersionError::tool(format!("appveyor {}: {}", args[0], e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(CiVersionError::tool(format!(
                "appveyor {} exited with {}",
                args[0], status
            )))
        }
    }
}

impl CiProvider for AppVeyorProvider {
    fn name(&self) -> &'static str {
        "AppVeyor"
    }

    fn is_active(&self) -> bool {
        self.env
            .get_non_blank("APPVEYOR")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    fn branch(&self) -> String {
        self.var("APPVEYOR_REPO_BRANCH")
    }

    fn commit_message_short(&self) -> String {
        self.var("APPVEYOR_REPO_COMMIT_MESSAGE")
    }

    fn commit_message_extended(&self) -> String {
        self.var("APPVEYOR_REPO_COMMIT_MESSAGE_EXTENDED")
    }

    fn reported_build_version(&self) -> String {
        self.var("APPVEYOR_BUILD_VERSION")
    }

    fn is_pull_request(&self) -> bool {
        self.env.get_non_blank("APPVEYOR_PULL_REQUEST_NUMBER").is_some()
    }

    fn update_build_version(&self, version: &str) -> Result<()> {
        self.run_worker_cli(&["UpdateBuild", "-Version", version])
    }

    fn report_message(&self, level: LogLevel, message: &str) -> Result<()> {
        let category = match level {
            LogLevel::Error => "Error",
            LogLevel::Warning => "Warning",
            _ => "Information",
        };
        self.run_worker_cli(&["AddMessage", message, "-Category", category])
    }

    fn upload_artifact(&self, path: &Path) -> Result<()> {
        self.run_worker_cli(&["PushArtifact", &path.to_string_lossy()])
    }

    fn upload_test_results(&self, path: &Path, format: &str) -> Result<()> {
        let job_id = self.env.get_non_blank("APPVEYOR_JOB_ID").ok_or_else(|| {
            CiVersionError::environment("APPVEYOR_JOB_ID not set; cannot upload test results")
        })?;
        let url = format!(
            "https://ci.appveyor.com/api/testresults/{}/{}",
            format, job_id
        );
        let file_arg = format!("file=@{}", path.to_string_lossy());
        let status = Command::new("curl")
            .args(["-sf", "-F", &file_arg, &url])
            .status()
            .map_err(|e| CiVersionError::tool(format!("curl: {}", e)))?;
        if status.success() {
            Ok(())
        } else {
            Err(CiVersionError::tool(format!(
                "test results upload to {} failed with {}",
                url, status
            )))
        }
    }
}
