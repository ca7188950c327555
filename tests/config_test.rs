use std::io::Write;

use ci_version::config::{load_config, VersionConfig};

#[test]
fn test_load_config_from_custom_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
default_branch = "main"
deploy_commands = ["Deploy", "Ship"]
"#
    )
    .unwrap();

    let config = load_config(file.path().to_str()).unwrap();
    assert_eq!(config.default_branch, "main");
    assert_eq!(
        config.deploy_commands,
        vec!["Deploy".to_string(), "Ship".to_string()]
    );
    // Untouched keys keep their defaults.
    assert_eq!(config.build_version_argument, "buildVersion");
    assert_eq!(config.master_base_version_var, "RootVersion.Master");
}

#[test]
fn test_load_config_missing_custom_path_is_error() {
    assert!(load_config(Some("/definitely/not/here/civersion.toml")).is_err());
}

#[test]
fn test_load_config_rejects_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "default_branch = [not toml").unwrap();
    assert!(load_config(file.path().to_str()).is_err());
}

#[test]
fn test_load_config_rejects_invalid_command_words() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"deploy_commands = ["de ploy"]"#).unwrap();
    assert!(load_config(file.path().to_str()).is_err());
}

#[test]
fn test_default_config_round_trips_through_toml() {
    let config = VersionConfig::default();
    let serialized = toml::to_string(&config).unwrap();
    let parsed: VersionConfig = toml::from_str(&serialized).unwrap();
    assert_eq!(parsed, config);
}
