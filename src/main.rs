use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use ci_version::config;
use ci_version::context::BuildContext;
use ci_version::env::ArgList;
use ci_version::logging::{BuildLog, ConsoleLog, Verbosity};

#[derive(clap::Parser)]
#[command(
    name = "ci-version",
    about = "Resolve the build version and deployment intent for the current environment"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Override the branch used for pre-release decisions")]
    branch: Option<String>,

    #[arg(long, default_value = "0.0.1", help = "Version used when nothing else resolves")]
    fallback: String,

    #[arg(long, help = "Explicit build version (highest precedence)")]
    build_version: Option<String>,

    #[arg(long, help = "Logging verbosity (quiet|minimal|normal|verbose|diagnostic)")]
    verbosity: Option<String>,

    #[arg(
        long = "set",
        value_name = "KEY=VAL",
        help = "Additional build argument (repeatable), e.g. --set configuration=Debug"
    )]
    set: Vec<String>,

    #[arg(long, help = "Report the resolved version back to the CI provider")]
    report: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("ci-version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let log = Arc::new(ConsoleLog::default());
    let mut build_args = ArgList::parse(&args.set);
    if let Some(version) = &args.build_version {
        build_args.set(config.build_version_argument.clone(), version.clone());
    }
    if let Some(raw) = &args.verbosity {
        match raw.parse::<Verbosity>() {
            Ok(level) => {
                log.set_verbosity(level);
                build_args.set("verbosity", raw.clone());
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    let mut ctx = match BuildContext::from_process(build_args, log, config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error building context: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(branch) = args.branch {
        ctx.set_branch(branch);
    }

    let info = ctx.next_version(&args.fallback);

    println!(
        "{} {}",
        console::style("Environment:").bold(),
        ctx.build_environment_name()
    );
    println!("{} {}", console::style("Branch:").bold(), ctx.branch());
    println!(
        "{} {}",
        console::style("Configuration:").bold(),
        ctx.configuration()
    );
    println!(
        "{} {}",
        console::style("Root version:").bold(),
        info.root_version
    );
    println!(
        "{} {}",
        console::style("Full version:").bold(),
        console::style(&info.full_version).green()
    );
    println!(
        "{} {}",
        console::style("Pre-release:").bold(),
        info.is_pre_release
    );
    println!(
        "{} {}",
        console::style("Pull request:").bold(),
        ctx.is_pull_request()
    );
    println!(
        "{} {}",
        console::style("Should deploy:").bold(),
        ctx.should_deploy()
    );
    if ctx.auto_deploy() {
        println!(
            "{} {}",
            console::style("Auto-deploy to:").bold(),
            console::style(ctx.auto_deploy_target()).yellow()
        );
    } else {
        println!("{} false", console::style("Auto-deploy:").bold());
    }

    if args.report {
        ctx.set_next_version(&info);
    }

    Ok(())
}
