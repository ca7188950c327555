//! CI provider facades
//!
//! Each supported continuous-integration platform is reached through the
//! [CiProvider] trait, which exposes the handful of facts and callbacks the
//! build context needs. Concrete implementations:
//!
//! - [appveyor::AppVeyorProvider]: AppVeyor build-worker environment
//! - [teamcity::TeamCityProvider]: TeamCity agent (service messages)
//! - [mock::MockProvider]: scriptable implementation for tests
//!
//! MyGet has no callback surface at all; it is recognized purely from
//! environment variables (`BuildRunner`/`PackageVersion`), so it appears
//! only as a [BuildEnvironment] variant.

pub mod appveyor;
pub mod mock;
pub mod teamcity;

pub use appveyor::AppVeyorProvider;
pub use mock::MockProvider;
pub use teamcity::TeamCityProvider;

use std::fmt;
use std::path::Path;

use crate::env::Environment;
use crate::error::Result;
use crate::logging::LogLevel;

/// Facade over one CI platform.
///
/// Read accessors return empty strings rather than errors when the platform
/// does not supply a value; callback failures surface as opaque
/// [crate::error::CiVersionError::Tool] errors.
pub trait CiProvider: Send + Sync {
    /// Platform display name.
    fn name(&self) -> &'static str;

    /// Whether the current process runs under this platform.
    fn is_active(&self) -> bool;

    /// Branch being built, or empty when unknown.
    fn branch(&self) -> String;

    /// First line of the commit message, or empty.
    fn commit_message_short(&self) -> String;

    /// Remainder of the commit message, or empty.
    fn commit_message_extended(&self) -> String;

    /// The platform's own idea of the build version, or empty.
    fn reported_build_version(&self) -> String;

    /// Whether this build is a pull-request build.
    fn is_pull_request(&self) -> bool;

    /// Push a computed version back so the platform UI shows it.
    fn update_build_version(&self, version: &str) -> Result<()>;

    /// Surface a message in the platform UI.
    fn report_message(&self, level: LogLevel, message: &str) -> Result<()>;

    /// Attach a file to the build.
    fn upload_artifact(&self, path: &Path) -> Result<()>;

    /// Publish a test-results file in the given format (e.g. "nunit3").
    fn upload_test_results(&self, path: &Path, format: &str) -> Result<()>;
}

/// Which build environment this process runs in.
///
/// Computed once, with explicit precedence, so at most one platform is ever
/// considered active even if several detection signals are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildEnvironment {
    AppVeyor,
    TeamCity,
    MyGet,
    Interactive,
}

impl BuildEnvironment {
    pub fn is_ci(self) -> bool {
        self != BuildEnvironment::Interactive
    }
}

impl fmt::Display for BuildEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildEnvironment::AppVeyor => "AppVeyor",
            BuildEnvironment::TeamCity => "TeamCity",
            BuildEnvironment::MyGet => "MyGet",
            BuildEnvironment::Interactive => "Interactive",
        };
        write!(f, "{}", name)
    }
}

/// MyGet runs builds with `BuildRunner=MyGet` in the environment.
pub fn is_my_get(env: &dyn Environment) -> bool {
    env.get_non_blank("BuildRunner")
        .map(|v| v.eq_ignore_ascii_case("myget"))
        .unwrap_or(false)
}

/// Classify the build environment with precedence
/// AppVeyor > TeamCity > MyGet > Interactive.
pub fn classify(
    app_veyor: &dyn CiProvider,
    team_city: &dyn CiProvider,
    env: &dyn Environment,
) -> BuildEnvironment {
    if app_veyor.is_active() {
        BuildEnvironment::AppVeyor
    } else if team_city.is_active() {
        BuildEnvironment::TeamCity
    } else if is_my_get(env) {
        BuildEnvironment::MyGet
    } else {
        BuildEnvironment::Interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FakeEnvironment;

    #[test]
    fn test_interactive_when_nothing_active() {
        let env = FakeEnvironment::new();
        let app = MockProvider::new("AppVeyor");
        let tc = MockProvider::new("TeamCity");
        assert_eq!(classify(&app, &tc, &env), BuildEnvironment::Interactive);
    }

    #[test]
    fn test_appveyor_wins_over_teamcity() {
        let env = FakeEnvironment::new();
        let app = MockProvider::new("AppVeyor").with_active(true);
        let tc = MockProvider::new("TeamCity").with_active(true);
        assert_eq!(classify(&app, &tc, &env), BuildEnvironment::AppVeyor);
    }

    #[test]
    fn test_teamcity_wins_over_myget() {
        let env = FakeEnvironment::new().with_var("BuildRunner", "MyGet");
        let app = MockProvider::new("AppVeyor");
        let tc = MockProvider::new("TeamCity").with_active(true);
        assert_eq!(classify(&app, &tc, &env), BuildEnvironment::TeamCity);
    }

    #[test]
    fn test_myget_detected_case_insensitively() {
        let env = FakeEnvironment::new().with_var("BuildRunner", "myget");
        let app = MockProvider::new("AppVeyor");
        let tc = MockProvider::new("TeamCity");
        assert_eq!(classify(&app, &tc, &env), BuildEnvironment::MyGet);
    }

    #[test]
    fn test_other_build_runner_is_interactive() {
        let env = FakeEnvironment::new().with_var("BuildRunner", "Jenkins");
        let app = MockProvider::new("AppVeyor");
        let tc = MockProvider::new("TeamCity");
        assert_eq!(classify(&app, &tc, &env), BuildEnvironment::Interactive);
    }

    #[test]
    fn test_is_ci() {
        assert!(BuildEnvironment::AppVeyor.is_ci());
        assert!(BuildEnvironment::TeamCity.is_ci());
        assert!(BuildEnvironment::MyGet.is_ci());
        assert!(!BuildEnvironment::Interactive.is_ci());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(BuildEnvironment::AppVeyor.to_string(), "AppVeyor");
        assert_eq!(BuildEnvironment::Interactive.to_string(), "Interactive");
    }
}
