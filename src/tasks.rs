//! Build-pipeline orchestration
//!
//! Straight-line wrappers that read the [BuildContext] and delegate to
//! external tools through small collaborator traits. There is no decision
//! logic here beyond the documented not-found and ambiguity policies; the
//! tools themselves are the host's concern.

use std::fs;
use std::path::{Path, PathBuf};

use crate::context::BuildContext;
use crate::error::{CiVersionError, Result};
use crate::logging::BuildLog;
use crate::version::VersionResult;

/// File lookup by glob pattern.
///
/// Results are sorted lexicographically so "first match" policies are
/// deterministic across file systems.
pub trait FileFinder: Send + Sync {
    fn find(&self, pattern: &str) -> Result<Vec<PathBuf>>;
}

/// [FileFinder] over the real file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFileFinder;

impl FileFinder for FsFileFinder {
    fn find(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let paths = glob::glob(pattern).map_err(|e| {
            CiVersionError::config(format!("Invalid glob pattern '{}': {}", pattern, e))
        })?;
        let mut files: Vec<PathBuf> = paths.filter_map(|entry| entry.ok()).collect();
        files.sort();
        Ok(files)
    }
}

/// Patches version metadata into a source file.
pub trait MetadataPatcher: Send + Sync {
    fn patch(&self, file: &Path, version: &VersionResult) -> Result<()>;
}

/// Runs a set of test assemblies, optionally writing a results file.
pub trait TestRunner: Send + Sync {
    fn run(&self, assemblies: &[PathBuf], results_file: Option<&Path>) -> Result<()>;
}

/// Creates a package from a manifest at a specific version.
pub trait Packager: Send + Sync {
    fn pack(&self, manifest: &Path, version: &str, output_dir: &Path) -> Result<()>;
}

/// Triggers a release deployment on the deploy server.
pub trait ReleaseDeployer: Send + Sync {
    fn deploy_release(
        &self,
        server: &str,
        api_key: &str,
        project: &str,
        version: &str,
        environment: &str,
    ) -> Result<()>;
}

/// A located solution file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionInfo {
    pub path: PathBuf,
    pub file_name: String,
}

fn solution_info(path: &Path) -> SolutionInfo {
    SolutionInfo {
        path: path.to_path_buf(),
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Locate the solution file to build.
///
/// Zero matches is a hard failure. Multiple matches without a
/// disambiguating `file_name` warn and use the first (sorted) match; with a
/// `file_name`, the case-insensitive match is required to exist.
pub fn solution_to_build(
    finder: &dyn FileFinder,
    log: &dyn BuildLog,
    file_name: Option<&str>,
) -> Result<SolutionInfo> {
    let files = finder.find("**/*.sln")?;
    if files.is_empty() {
        return Err(CiVersionError::not_found("Solution file not found"));
    }
    if files.len() > 1 {
        match file_name {
            Some(name) => {
                let matched = files.iter().find(|f| {
                    f.file_name()
                        .map(|n| n.to_string_lossy().eq_ignore_ascii_case(name))
                        .unwrap_or(false)
                });
                return match matched {
                    Some(file) => Ok(solution_info(file)),
                    None => Err(CiVersionError::not_found(format!(
                        "Solution file specified as {} was not found",
                        name
                    ))),
                };
            }
            None => {
                log.warning("Multiple solution files found");
                for file in &files {
                    log.warning(&file.display().to_string());
                }
            }
        }
    }
    Ok(solution_info(&files[0]))
}

/// Patch version metadata into the solution's source files.
///
/// A single `SolutionVersion.cs` wins; otherwise every `AssemblyInfo.cs`
/// outside `packages/` is patched.
pub fn patch_assembly_metadata(
    ctx: &BuildContext,
    finder: &dyn FileFinder,
    patcher: &dyn MetadataPatcher,
    version: &VersionResult,
) -> Result<()> {
    let solution_version = finder.find("**/SolutionVersion.cs")?;
    if solution_version.len() == 1 {
        let file = &solution_version[0];
        ctx.log().info(&format!(
            "Patching single solution version file: {}",
            file.display()
        ));
        return patcher.patch(file, version);
    }

    for file in finder.find("**/AssemblyInfo.cs")? {
        ctx.log()
            .verbose(&format!("Possible file to patch: {}", file.display()));
        if file.to_string_lossy().contains("packages/") {
            continue;
        }
        ctx.log().info(&format!("Patching {}", file.display()));
        patcher.patch(&file, version)?;
    }
    Ok(())
}

/// Run discovered test assemblies.
///
/// Zero assemblies is a soft no-op (error logged, nothing run). On
/// AppVeyor the results file is uploaded even when the run itself failed.
pub fn run_tests(
    ctx: &BuildContext,
    finder: &dyn FileFinder,
    runner: &dyn TestRunner,
    results_format: &str,
) -> Result<()> {
    let configuration = ctx.configuration();
    let mut assemblies = finder.find(&format!("**/bin/{}/*.Tests.dll", configuration))?;
    assemblies.extend(finder.find(&format!("**/bin/{}/*.Test.dll", configuration))?);
    assemblies.sort();
    assemblies.dedup();

    if assemblies.is_empty() {
        ctx.log().error("No tests found");
        return Ok(());
    }
    for file in &assemblies {
        ctx.log()
            .verbose(&format!("Using test assembly: {}", file.display()));
    }

    let results_file = if ctx.is_interactive() {
        None
    } else {
        Some(PathBuf::from("TestResult.xml"))
    };

    let run_result = runner.run(&assemblies, results_file.as_deref());

    // Results are pushed to AppVeyor even when the run failed, so broken
    // builds still show their test report.
    if ctx.is_app_veyor() {
        if let (Some(provider), Some(path)) = (ctx.active_provider(), results_file.as_ref()) {
            provider.upload_test_results(path, results_format)?;
        }
    }
    run_result
}

/// Create a package for every manifest, into `output_dir`.
pub fn create_packages(
    ctx: &BuildContext,
    finder: &dyn FileFinder,
    packager: &dyn Packager,
    full_version: &str,
    output_dir: &Path,
) -> Result<()> {
    let manifests = finder.find("**/*.nuspec")?;
    if manifests.is_empty() {
        return Err(CiVersionError::not_found(
            "No .nuspec files found to create packages from",
        ));
    }

    fs::create_dir_all(output_dir)?;
    for manifest in manifests {
        ctx.log().info(&manifest.display().to_string());
        packager.pack(&manifest, full_version, output_dir)?;
    }
    Ok(())
}

/// Upload everything in the artifacts folder to the active provider.
pub fn upload_artifacts(ctx: &BuildContext, finder: &dyn FileFinder) -> Result<()> {
    ctx.log().info("Looking for artifacts in 'Artifacts/*.*'");
    let artifacts = finder.find("Artifacts/*.*")?;
    let provider = match ctx.active_provider() {
        Some(provider) => provider,
        None => {
            ctx.log().info("Interactive build; skipping artifact upload");
            return Ok(());
        }
    };
    for artifact in artifacts {
        ctx.log().info(&format!(
            "Found artifact '{}' - uploading",
            artifact.display()
        ));
        provider.upload_artifact(&artifact)?;
    }
    Ok(())
}

/// Trigger a release deployment using the deploy-server settings from the
/// environment.
pub fn trigger_release(
    ctx: &BuildContext,
    deployer: &dyn ReleaseDeployer,
    version: &str,
    environment: &str,
) -> Result<()> {
    let server = require_env(ctx, "Octopus.ApiHttp")?;
    let api_key = require_env(ctx, "Octopus.PublishApiKey")?;
    let project = require_env(ctx, "Octopus.ProjectName")?;

    ctx.log().info(&format!(
        "Deploying release {} of {} to {}",
        version, project, environment
    ));
    deployer.deploy_release(&server, &api_key, &project, version, environment)
}

fn require_env(ctx: &BuildContext, name: &str) -> Result<String> {
    ctx.env.get_non_blank(name).ok_or_else(|| {
        CiVersionError::config(format!("{} environment variable not defined", name))
    })
}
