//! End-to-end scenarios for version resolution and deployment intent,
//! wired through the public API with fake collaborators.

use std::sync::Arc;

use ci_version::config::VersionConfig;
use ci_version::context::BuildContext;
use ci_version::env::{FakeArguments, FakeEnvironment};
use ci_version::logging::MemoryLog;
use ci_version::providers::MockProvider;

const FALLBACK: &str = "1.1.1";

fn build_context(
    env: FakeEnvironment,
    args: FakeArguments,
    app_veyor: MockProvider,
    team_city: MockProvider,
) -> BuildContext {
    BuildContext::new(
        Arc::new(env),
        Arc::new(args),
        Arc::new(MemoryLog::new()),
        Arc::new(app_veyor),
        Arc::new(team_city),
        VersionConfig::default(),
    )
    .expect("context should build")
}

#[test]
fn scenario_a_explicit_argument_on_default_branch() {
    let args = FakeArguments::new().with_arg("buildVersion", "2.3.4");
    let mut ctx = build_context(
        FakeEnvironment::new(),
        args,
        MockProvider::new("AppVeyor"),
        MockProvider::new("TeamCity"),
    );
    ctx.set_branch("master");

    assert_eq!(ctx.base_version_string(FALLBACK), "2.3.4");
    assert!(!ctx.is_pre_release());
    let info = ctx.next_version(FALLBACK);
    assert_eq!(info.full_version, "2.3.4");
    assert_eq!(info.root_version, "2.3.4");
}

#[test]
fn scenario_b_appveyor_feature_branch_gets_suffix() {
    let app_veyor = MockProvider::new("AppVeyor")
        .with_active(true)
        .with_branch("someFeature")
        .with_build_version("2.3.4");
    let ctx = build_context(
        FakeEnvironment::new(),
        FakeArguments::new(),
        app_veyor,
        MockProvider::new("TeamCity"),
    );

    assert!(ctx.is_app_veyor());
    assert!(ctx.is_pre_release());
    let info = ctx.next_version(FALLBACK);
    assert_eq!(info.full_version, "2.3.4-someFeature");
}

#[test]
fn scenario_c_teamcity_base_version_selection() {
    for (branch, expected) in [("master", "2.3.12"), ("someFeature", "1.2.12")] {
        let env = FakeEnvironment::new()
            .with_var("BUILD_NUMBER", "12")
            .with_var("RootVersion.Master", "2.3")
            .with_var("RootVersion.Feature", "1.2");
        let team_city = MockProvider::new("TeamCity").with_active(true);
        let mut ctx = build_context(
            env,
            FakeArguments::new(),
            MockProvider::new("AppVeyor"),
            team_city,
        );
        ctx.set_branch(branch);

        assert!(ctx.is_team_city());
        assert_eq!(ctx.base_version_string(FALLBACK), expected);
    }
}

#[test]
fn scenario_d_commit_directive_triggers_auto_deploy() {
    let app_veyor = MockProvider::new("AppVeyor")
        .with_active(true)
        .with_branch("someFeature")
        .with_build_version("2.3.4")
        .with_extended_message("[deploy UAT5]");
    let ctx = build_context(
        FakeEnvironment::new(),
        FakeArguments::new(),
        app_veyor,
        MockProvider::new("TeamCity"),
    );

    assert!(ctx.auto_deploy());
    assert_eq!(ctx.auto_deploy_target(), "uat5");
    assert!(!ctx.should_deploy());
}

#[test]
fn directive_pattern_built_from_config_matches_lowercase() {
    // Round-trip: the configured command list produces a pattern that
    // matches the canonical example.
    let app_veyor = MockProvider::new("AppVeyor")
        .with_active(true)
        .with_branch("someFeature")
        .with_extended_message("[deploy uat4]");
    let ctx = build_context(
        FakeEnvironment::new(),
        FakeArguments::new(),
        app_veyor,
        MockProvider::new("TeamCity"),
    );

    assert!(ctx.directive().success);
    assert_eq!(ctx.auto_deploy_target(), "uat4");
}

#[test]
fn default_branch_with_directive_does_not_auto_deploy() {
    let app_veyor = MockProvider::new("AppVeyor")
        .with_active(true)
        .with_branch("master")
        .with_build_version("2.3.4")
        .with_extended_message("[deploy uat4]");
    let ctx = build_context(
        FakeEnvironment::new(),
        FakeArguments::new(),
        app_veyor,
        MockProvider::new("TeamCity"),
    );

    assert!(!ctx.auto_deploy());
    assert!(ctx.should_deploy());
}

#[test]
fn pull_request_blocks_both_deploy_paths() {
    let app_veyor = MockProvider::new("AppVeyor")
        .with_active(true)
        .with_branch("someFeature")
        .with_extended_message("[deploy uat4]")
        .with_pull_request(true);
    let ctx = build_context(
        FakeEnvironment::new(),
        FakeArguments::new(),
        app_veyor,
        MockProvider::new("TeamCity"),
    );

    assert!(ctx.is_pull_request());
    assert!(!ctx.auto_deploy());
    assert!(!ctx.should_deploy());
}

#[test]
fn resolved_version_reported_back_to_provider() {
    let app_veyor = Arc::new(
        MockProvider::new("AppVeyor")
            .with_active(true)
            .with_branch("someFeature")
            .with_build_version("2.3.4"),
    );
    let ctx = BuildContext::new(
        Arc::new(FakeEnvironment::new()),
        Arc::new(FakeArguments::new()),
        Arc::new(MemoryLog::new()),
        app_veyor.clone(),
        Arc::new(MockProvider::new("TeamCity")),
        VersionConfig::default(),
    )
    .expect("context should build");

    let info = ctx.next_version(FALLBACK);
    ctx.set_next_version(&info);

    assert_eq!(
        app_veyor.reported_versions(),
        vec!["2.3.4-someFeature".to_string()]
    );
}
