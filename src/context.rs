//! Build context: the once-per-build snapshot of environment facts
//!
//! Constructed at the start of a pipeline run and then only read. The one
//! exception is the branch, which callers may override for decisions made
//! before provider state exists (local runs, tests); see
//! [BuildContext::set_branch].

use std::sync::Arc;

use crate::config::VersionConfig;
use crate::directive::{DirectiveMatch, DirectiveParser};
use crate::env::{ArgList, Arguments, Environment, ProcessEnvironment};
use crate::error::Result;
use crate::logging::{BuildLog, Verbosity};
use crate::providers::{
    self, AppVeyorProvider, BuildEnvironment, CiProvider, TeamCityProvider,
};

/// Verbosity handed to the package tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageVerbosity {
    Quiet,
    Detailed,
}

/// Read-only snapshot of the facts a build's decisions depend on.
pub struct BuildContext {
    pub(crate) env: Arc<dyn Environment>,
    pub(crate) args: Arc<dyn Arguments>,
    pub(crate) log: Arc<dyn BuildLog>,
    pub(crate) app_veyor: Arc<dyn CiProvider>,
    pub(crate) team_city: Arc<dyn CiProvider>,
    config: VersionConfig,
    environment: BuildEnvironment,
    branch: String,
    configuration: String,
    commit_message_short: String,
    directive: DirectiveMatch,
    is_default_logging_level: bool,
}

impl BuildContext {
    /// Build a context from explicit collaborators.
    ///
    /// Classifies the build environment once (AppVeyor > TeamCity > MyGet >
    /// Interactive), resolves the effective verbosity, and eagerly copies
    /// branch and commit messages from the active provider, running the
    /// deploy-directive match immediately.
    pub fn new(
        env: Arc<dyn Environment>,
        args: Arc<dyn Arguments>,
        log: Arc<dyn BuildLog>,
        app_veyor: Arc<dyn CiProvider>,
        team_city: Arc<dyn CiProvider>,
        config: VersionConfig,
    ) -> Result<Self> {
        config.validate()?;
        let parser = DirectiveParser::from_config(&config)?;
        let environment = providers::classify(app_veyor.as_ref(), team_city.as_ref(), env.as_ref());

        let configuration = env
            .get_non_blank("CONFIGURATION")
            .or_else(|| args.get("configuration"))
            .unwrap_or_else(|| "Release".to_string());

        let mut is_default_logging_level = true;
        match env.get_non_blank("LOGGINGLEVEL") {
            Some(raw) => match raw.parse::<Verbosity>() {
                Ok(level) => {
                    log.set_verbosity(level);
                    log.always(&format!("Logging Level: {}", level));
                    is_default_logging_level = false;
                }
                Err(_) => {
                    log.warning(&format!(
                        "Unknown LOGGINGLEVEL value '{}'; using {}",
                        raw,
                        log.verbosity()
                    ));
                }
            },
            None => is_default_logging_level = !args.has("verbosity"),
        }

        let mut branch = String::new();
        let mut commit_message_short = String::new();
        let mut directive = DirectiveMatch::none();
        let active: Option<&dyn CiProvider> = match environment {
            BuildEnvironment::AppVeyor => Some(app_veyor.as_ref()),
            BuildEnvironment::TeamCity => Some(team_city.as_ref()),
            BuildEnvironment::MyGet | BuildEnvironment::Interactive => None,
        };
        if let Some(provider) = active {
            branch = provider.branch();
            commit_message_short = provider.commit_message_short();
            let extended = provider.commit_message_extended();
            directive = parser.parse(&extended);
            log.debug(&format!("Branch: {}", branch));
            log.debug(&format!("Commit message (short): {}", commit_message_short));
            log.debug(&format!("Commit message (extended): {}", extended));
            log.debug(&format!("Deploy directive matched: {}", directive.success));
            if directive.success {
                log.debug(&format!("  command: {}", directive.command));
                log.debug(&format!("  argument: {}", directive.argument));
            }
        }

        Ok(BuildContext {
            env,
            args,
            log,
            app_veyor,
            team_city,
            config,
            environment,
            branch,
            configuration,
            commit_message_short,
            directive,
            is_default_logging_level,
        })
    }

    /// Build a context from the ambient process environment and the real
    /// provider facades.
    pub fn from_process(
        args: ArgList,
        log: Arc<dyn BuildLog>,
        config: VersionConfig,
    ) -> Result<Self> {
        let env: Arc<dyn Environment> = Arc::new(ProcessEnvironment);
        let app_veyor = Arc::new(AppVeyorProvider::new(env.clone()));
        let team_city = Arc::new(TeamCityProvider::new(env.clone()));
        Self::new(env, Arc::new(args), log, app_veyor, team_city, config)
    }

    pub fn config(&self) -> &VersionConfig {
        &self.config
    }

    pub fn log(&self) -> &dyn BuildLog {
        self.log.as_ref()
    }

    /// Branch used for pre-release decisions.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Override the branch used for pre-release decisions.
    ///
    /// This does not re-run the deploy-directive match: the directive was
    /// captured from the provider's commit message at construction and is
    /// unrelated to the branch name.
    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.branch = branch.into();
    }

    /// Build configuration (env `CONFIGURATION`, else the `configuration`
    /// argument, else "Release").
    pub fn configuration(&self) -> &str {
        &self.configuration
    }

    /// First line of the commit message, when the provider exposes it.
    pub fn commit_message_short(&self) -> &str {
        &self.commit_message_short
    }

    /// Result of the deploy-directive match captured at construction.
    pub fn directive(&self) -> &DirectiveMatch {
        &self.directive
    }

    pub fn build_environment(&self) -> BuildEnvironment {
        self.environment
    }

    pub fn build_environment_name(&self) -> String {
        self.environment.to_string()
    }

    /// The provider this build runs under, when it has a callback surface.
    pub fn active_provider(&self) -> Option<&dyn CiProvider> {
        match self.environment {
            BuildEnvironment::AppVeyor => Some(self.app_veyor.as_ref()),
            BuildEnvironment::TeamCity => Some(self.team_city.as_ref()),
            BuildEnvironment::MyGet | BuildEnvironment::Interactive => None,
        }
    }

    pub fn is_app_veyor(&self) -> bool {
        self.environment == BuildEnvironment::AppVeyor
    }

    pub fn is_team_city(&self) -> bool {
        self.environment == BuildEnvironment::TeamCity
    }

    pub fn is_my_get(&self) -> bool {
        self.environment == BuildEnvironment::MyGet
    }

    pub fn is_interactive(&self) -> bool {
        self.environment == BuildEnvironment::Interactive
    }

    pub fn is_ci_build(&self) -> bool {
        self.environment.is_ci()
    }

    pub fn is_pull_request(&self) -> bool {
        self.active_provider()
            .map(|p| p.is_pull_request())
            .unwrap_or(false)
    }

    /// Any branch other than the configured default branch is a pre-release
    /// build. The comparison is case-insensitive.
    pub fn is_pre_release(&self) -> bool {
        !self.branch.eq_ignore_ascii_case(&self.config.default_branch)
    }

    /// Deploy the normal way: a CI build of the default branch that is not
    /// a pull request.
    pub fn should_deploy(&self) -> bool {
        self.is_ci_build() && !self.is_pre_release() && !self.is_pull_request()
    }

    /// Deploy automatically: a CI pre-release build, not a pull request,
    /// whose commit message carried a deploy directive.
    pub fn auto_deploy(&self) -> bool {
        self.is_ci_build()
            && self.is_pre_release()
            && !self.is_pull_request()
            && self.directive.success
    }

    /// Lowercased directive target, or empty when nothing matched.
    pub fn auto_deploy_target(&self) -> String {
        if self.directive.success {
            self.directive.argument.to_lowercase()
        } else {
            String::new()
        }
    }

    /// Whether the verbosity is still the built-in default (no environment
    /// override, no explicit `verbosity` argument).
    pub fn is_default_logging_level(&self) -> bool {
        self.is_default_logging_level
    }

    /// Verbosity for the package tool: detailed only when the build runs
    /// strictly above normal verbosity.
    pub fn package_tool_verbosity(&self) -> PackageVerbosity {
        if self.log.verbosity() > Verbosity::Normal {
            PackageVerbosity::Detailed
        } else {
            PackageVerbosity::Quiet
        }
    }

    /// Verbosity for the build tool: minimal unless a level was set
    /// explicitly.
    pub fn build_tool_verbosity(&self) -> Verbosity {
        if self.is_default_logging_level {
            Verbosity::Minimal
        } else {
            self.log.verbosity()
        }
    }
}
