use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{CiVersionError, Result};

/// Configuration surface for version resolution and deployment-intent
/// detection.
///
/// Every key has the well-known default and can also be overridden from a
/// `civersion.toml` file or set programmatically before the build context
/// is constructed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionConfig {
    /// Build argument carrying an explicit version (highest precedence).
    #[serde(default = "default_build_version_argument")]
    pub build_version_argument: String,

    /// Branch that produces non-pre-release builds.
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Environment variable holding the `MAJOR.MINOR` base for default-branch
    /// builds on TeamCity.
    #[serde(default = "default_master_base_version_var")]
    pub master_base_version_var: String,

    /// Environment variable holding the `MAJOR.MINOR` base for pre-release
    /// builds on TeamCity.
    #[serde(default = "default_prerelease_base_version_var")]
    pub prerelease_base_version_var: String,

    /// Command words recognized inside a `[<command> <target>]` commit
    /// directive, matched case-insensitively.
    #[serde(default = "default_deploy_commands")]
    pub deploy_commands: Vec<String>,
}

fn default_build_version_argument() -> String {
    "buildVersion".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_master_base_version_var() -> String {
    "RootVersion.Master".to_string()
}

fn default_prerelease_base_version_var() -> String {
    "RootVersion.Feature".to_string()
}

fn default_deploy_commands() -> Vec<String> {
    vec!["Deploy".to_string()]
}

impl Default for VersionConfig {
    fn default() -> Self {
        VersionConfig {
            build_version_argument: default_build_version_argument(),
            default_branch: default_branch(),
            master_base_version_var: default_master_base_version_var(),
            prerelease_base_version_var: default_prerelease_base_version_var(),
            deploy_commands: default_deploy_commands(),
        }
    }
}

impl VersionConfig {
    /// Validate keys that are interpolated into other machinery.
    ///
    /// Deploy command words become part of a regex alternation, so they must
    /// be non-empty and contain word characters only.
    pub fn validate(&self) -> Result<()> {
        if self.deploy_commands.is_empty() {
            return Err(CiVersionError::config(
                "At least one deploy command word is required",
            ));
        }
        for word in &self.deploy_commands {
            if word.is_empty() || !word.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(CiVersionError::config(format!(
                    "Invalid deploy command word: '{}'",
                    word
                )));
            }
        }
        if self.default_branch.trim().is_empty() {
            return Err(CiVersionError::config("Default branch must not be blank"));
        }
        if self.build_version_argument.trim().is_empty() {
            return Err(CiVersionError::config(
                "Build version argument name must not be blank",
            ));
        }
        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `civersion.toml` in current directory
/// 3. `.civersion.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(VersionConfig)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed, or validated
pub fn load_config(config_path: Option<&str>) -> Result<VersionConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./civersion.toml").exists() {
        fs::read_to_string("./civersion.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".civersion.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(VersionConfig::default());
        }
    } else {
        return Ok(VersionConfig::default());
    };

    let config: VersionConfig = toml::from_str(&config_str)
        .map_err(|e| CiVersionError::config(format!("Invalid config file: {}", e)))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VersionConfig::default();
        assert_eq!(config.build_version_argument, "buildVersion");
        assert_eq!(config.default_branch, "master");
        assert_eq!(config.master_base_version_var, "RootVersion.Master");
        assert_eq!(config.prerelease_base_version_var, "RootVersion.Feature");
        assert_eq!(config.deploy_commands, vec!["Deploy".to_string()]);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(VersionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: VersionConfig = toml::from_str(r#"default_branch = "main""#).unwrap();
        assert_eq!(config.default_branch, "main");
        assert_eq!(config.build_version_argument, "buildVersion");
        assert_eq!(config.deploy_commands, vec!["Deploy".to_string()]);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: VersionConfig = toml::from_str("").unwrap();
        assert_eq!(config, VersionConfig::default());
    }

    #[test]
    fn test_validate_rejects_empty_command_list() {
        let config = VersionConfig {
            deploy_commands: vec![],
            ..VersionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_word_command() {
        for bad in ["", "de ploy", "deploy]", "a|b"] {
            let config = VersionConfig {
                deploy_commands: vec![bad.to_string()],
                ..VersionConfig::default()
            };
            assert!(config.validate().is_err(), "'{}' should be rejected", bad);
        }
    }

    #[test]
    fn test_validate_rejects_blank_branch() {
        let config = VersionConfig {
            default_branch: "  ".to_string(),
            ..VersionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multiple_command_words_are_valid() {
        let config = VersionConfig {
            deploy_commands: vec!["Deploy".to_string(), "Release".to_string()],
            ..VersionConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
