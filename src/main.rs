//! Bundle Compiler - concatenate and minify JavaScript and CSS, mirror static files.

mod build;
mod cli;
mod compiler;
mod config;
mod error;
mod logger;
mod utils;

use anyhow::Result;
use build::Pipeline;
use clap::Parser;
use cli::Cli;
use config::{BuildConfig, ConfigError};
use error::EXIT_USAGE;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            err.print().ok();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            err.print().ok();
            println!("\n{}", cli::manifest_help());
            logger::failure_banner("Incorrect amount of arguments supplied");
            return ExitCode::from(EXIT_USAGE);
        }
    };
    logger::set_quiet(cli.quiet);

    match run(&cli) {
        Ok(report) => {
            logger::success_banner(report.elapsed);
            ExitCode::SUCCESS
        }
        Err(err) => {
            if err.chain().any(|cause| cause.is::<ConfigError>()) {
                println!("{}\n", cli::manifest_help());
            }
            logger::failure_banner(&format!("{err:#}"));
            ExitCode::from(error::exit_code(&err))
        }
    }
}

/// Load the manifest and run every build phase.
fn run(cli: &Cli) -> Result<build::BuildReport> {
    let tools = cli.tools_dir()?;
    let config = BuildConfig::load(&cli.manifest, &tools)?;
    log!("build"; "building `{}` from {}", config.project, config.config_path.display());

    let report = Pipeline::new(&config, cli.quiet).run()?;
    for (module, bundle) in [("js", &report.scripts), ("css", &report.styles)] {
        if let Some(bundle) = bundle {
            log!(module; "{} files -> {}", bundle.files, bundle.minified.display());
        }
    }
    Ok(report)
}
