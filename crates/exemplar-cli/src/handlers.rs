//! Command handlers for CLI operations

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use exemplar_core::{HarnessConfig, OutputFormat};
use exemplar_fixtures::{LoadedFixture, SuiteOptions, discover_all, run_suite};
use tracing::{info, warn};

use crate::cli::{ListArgs, RunArgs};

/// Report output goes to stdout; logs go to stderr.
fn emit(text: &str) {
    #[allow(clippy::print_stdout, reason = "Report output")]
    {
        print!("{text}");
    }
}

fn fixture_roots(paths: Vec<PathBuf>, config: &HarnessConfig) -> Vec<PathBuf> {
    if paths.is_empty() {
        vec![config.fixtures_dir.clone()]
    } else {
        paths
    }
}

/// Apply `run` flags on top of the loaded configuration.
///
/// # Errors
/// Returns an error if the resulting configuration is invalid.
pub fn apply_overrides(mut config: HarnessConfig, args: &RunArgs) -> Result<HarnessConfig> {
    if let Some(format) = args.format {
        config.format = format.into();
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if args.no_catch_panics {
        config.catch_panics = false;
    }
    config.validate().context("Invalid command-line options")?;
    Ok(config)
}

/// Handle `exemplar run`
///
/// # Errors
/// Returns an error if fixture discovery or report rendering fails.
pub async fn handle_run(args: RunArgs, config: HarnessConfig) -> Result<ExitCode> {
    let config = apply_overrides(config, &args)?;
    let roots = fixture_roots(args.paths, &config);
    let fixtures = discover_all(&roots).context("Failed to discover fixtures")?;
    if fixtures.is_empty() {
        warn!(roots = ?roots, "no fixture files found");
    }

    let options = SuiteOptions {
        jobs: config.jobs,
        catch_panics: config.catch_panics,
    };
    let report = run_suite(fixtures, options).await;

    let rendered = match config.format {
        OutputFormat::Text => report.render_text(),
        OutputFormat::Json => {
            let mut json = report.render_json().context("Failed to render JSON report")?;
            json.push('\n');
            json
        }
    };
    emit(&rendered);

    match report.enforce_gate() {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(gate) => {
            info!(%gate, "run did not pass");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Handle `exemplar list`
///
/// Prints one line per fixture file: path, fixture name and example count,
/// or the load error.
///
/// # Errors
/// Returns an error if fixture discovery fails.
pub fn handle_list(args: ListArgs, config: &HarnessConfig) -> Result<ExitCode> {
    let roots = fixture_roots(args.paths, config);
    let fixtures = discover_all(&roots).context("Failed to discover fixtures")?;

    let mut listing = String::new();
    let mut all_loaded = true;
    for path in &fixtures {
        let line = match LoadedFixture::load(path) {
            Ok(fixture) => format!(
                "{}\t{}\t{} examples\n",
                path.display(),
                fixture.name(),
                fixture.registry().len()
            ),
            Err(error) => {
                all_loaded = false;
                format!("{}\tLOAD ERROR\t{error}\n", path.display())
            }
        };
        listing.push_str(&line);
    }
    emit(&listing);

    Ok(if all_loaded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
