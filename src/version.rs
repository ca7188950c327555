//! Version resolution
//!
//! Computes the version a build should carry from a strict precedence
//! chain (explicit argument > provider value > environment-derived value >
//! fallback) and formats the pre-release suffix. These operations never
//! fail: every branch of the chain has a defined fallback.

use crate::context::BuildContext;
use crate::providers::BuildEnvironment;

/// Pre-release suffix length cap, dash included.
const MAX_SUFFIX_LEN: usize = 20;

/// A resolved build version.
///
/// `full_version` always starts with `root_version`; they differ exactly
/// when `is_pre_release` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionResult {
    /// Numeric semantic-version portion, e.g. "2.3.4".
    pub root_version: String,
    /// Root version plus the optional pre-release suffix.
    pub full_version: String,
    /// Whether this build is a pre-release.
    pub is_pre_release: bool,
}

impl BuildContext {
    /// Resolve the base (root) version string.
    ///
    /// Precedence:
    /// 1. The configured build-version argument, returned verbatim.
    /// 2. AppVeyor's own build version, unless blank.
    /// 3. On TeamCity, `{base}.{BUILD_NUMBER}` where the `MAJOR.MINOR` base
    ///    comes from one of two environment variables selected by
    ///    [BuildContext::is_pre_release]. A missing variable logs one
    ///    warning and yields the fallback.
    /// 4. On MyGet, the `PackageVersion` variable, unless blank.
    /// 5. The supplied fallback.
    pub fn base_version_string(&self, fallback: &str) -> String {
        if let Some(version) = self.args.get(&self.config().build_version_argument) {
            return version;
        }
        match self.build_environment() {
            BuildEnvironment::AppVeyor => {
                let version = self.app_veyor.reported_build_version();
                self.log
                    .verbose(&format!("AppVeyor build version: {}", version));
                if version.trim().is_empty() {
                    fallback.to_string()
                } else {
                    version
                }
            }
            BuildEnvironment::TeamCity => self.team_city_version(fallback),
            BuildEnvironment::MyGet => self
                .env
                .get_non_blank("PackageVersion")
                .unwrap_or_else(|| fallback.to_string()),
            BuildEnvironment::Interactive => fallback.to_string(),
        }
    }

    fn team_city_version(&self, fallback: &str) -> String {
        let config = self.config();
        let master_root = match self.env.get_non_blank(&config.master_base_version_var) {
            Some(value) => value,
            None => {
                self.log.warning(&format!(
                    "{} environment variable not defined. Should be like 2.3 or something: \
                     the first two parts of the version number for default-branch builds",
                    config.master_base_version_var
                ));
                return fallback.to_string();
            }
        };
        let prerelease_root = match self.env.get_non_blank(&config.prerelease_base_version_var) {
            Some(value) => value,
            None => {
                self.log.warning(&format!(
                    "{} environment variable not defined. Should be like 1.3 or something: \
                     the first two parts of the version number for pre-release builds",
                    config.prerelease_base_version_var
                ));
                return fallback.to_string();
            }
        };
        let base = if self.is_pre_release() {
            prerelease_root
        } else {
            master_root
        };
        // BUILD_NUMBER is appended as-is; TeamCity always sets it.
        format!(
            "{}.{}",
            base,
            self.env.get("BUILD_NUMBER").unwrap_or_default()
        )
    }

    /// Resolve the full version, appending the pre-release suffix when the
    /// branch is not the default branch.
    ///
    /// The suffix is `-` plus the branch name with underscores removed,
    /// truncated (dash included) to at most 20 characters.
    pub fn next_version(&self, fallback: &str) -> VersionResult {
        let root_version = self.base_version_string(fallback);
        if self.is_pre_release() {
            let mut label = format!("-{}", self.branch().replace('_', ""));
            if label.chars().count() > MAX_SUFFIX_LEN {
                label = label.chars().take(MAX_SUFFIX_LEN).collect();
            }
            self.log
                .verbose(&format!("Pre-release detected: {}", label));
            VersionResult {
                full_version: format!("{}{}", root_version, label),
                root_version,
                is_pre_release: true,
            }
        } else {
            VersionResult {
                full_version: root_version.clone(),
                root_version,
                is_pre_release: false,
            }
        }
    }

    /// Push the resolved version back to the active provider so its build
    /// display reflects it. Logs unconditionally; never fails the build.
    pub fn set_next_version(&self, version: &VersionResult) {
        self.log.info(&format!("Building {}", version.full_version));
        match self.build_environment() {
            BuildEnvironment::Interactive => self.log.info("Interactive build mode"),
            BuildEnvironment::AppVeyor => {
                if let Err(e) = self.app_veyor.update_build_version(&version.full_version) {
                    self.log
                        .warning(&format!("Could not update AppVeyor build version: {}", e));
                }
            }
            BuildEnvironment::TeamCity => {
                if let Err(e) = self.team_city.update_build_version(&version.full_version) {
                    self.log
                        .warning(&format!("Could not set TeamCity build number: {}", e));
                }
            }
            BuildEnvironment::MyGet => {}
        }
    }
}
