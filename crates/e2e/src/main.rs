//! Storefront E2E runner
//!
//! Runs the YAML scenarios and the users API checks against one environment
//! and writes `test-results.json`. Exit code 0 when everything passed, 1 on
//! test failures, 2 when the run could not start.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use storefront_common::config::{DEFAULT_ENV, ENV_VAR};
use storefront_common::EnvConfig;
use storefront_e2e::runner::{RunnerConfig, TestSuiteResult};
use storefront_e2e::TestRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Suite {
    /// Browser scenarios only
    Ui,
    /// Users API checks only
    Api,
    All,
}

#[derive(Parser, Debug)]
#[command(name = "storefront-e2e")]
#[command(author, version, about = "E2E test runner for the storefront demo", long_about = None)]
struct Args {
    /// Directory holding `<env>.json` environment configs
    #[arg(long, default_value = "configs")]
    configs: PathBuf,

    /// Environment to run against
    #[arg(long, env = ENV_VAR, default_value = DEFAULT_ENV)]
    env: String,

    /// Path to scenario specs directory
    #[arg(short, long, default_value = "crates/e2e/specs")]
    specs: PathBuf,

    /// Run only scenarios matching this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// Which checks to run
    #[arg(long, value_enum, default_value = "all")]
    suite: Suite,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Scenarios run at once
    #[arg(short, long, default_value = "1")]
    workers: usize,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,

    /// Treat uncaught application exceptions as failures
    #[arg(long)]
    fail_on_page_errors: bool,

    /// Chrome binary; auto-detected when unset
    #[arg(long, env = "CHROME")]
    chrome: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let result = tokio::runtime::Runtime::new()
        .context("failed to create tokio runtime")
        .and_then(|rt| rt.block_on(async_main(args)));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> anyhow::Result<bool> {
    let env = EnvConfig::load_named(&args.configs, &args.env)
        .with_context(|| format!("loading environment '{}'", args.env))?;

    let mut config = RunnerConfig::new(env);
    config.browser.headed = args.headed;
    config.browser.chrome_path = args.chrome;
    config.specs_dir = args.specs;
    config.output_dir = args.output;
    config.workers = args.workers;
    config.fail_on_page_errors = args.fail_on_page_errors;

    let runner = TestRunner::new(config);

    let mut results = TestSuiteResult::default();

    if args.suite != Suite::Api {
        let ui = if let Some(name) = &args.name {
            let result = runner.run_test(name).await?;
            let duration_ms = result.duration_ms;
            TestSuiteResult::from_results(vec![result], duration_ms)
        } else if let Some(tag) = &args.tag {
            runner.run_tagged(tag).await?
        } else {
            runner.run_all().await?
        };
        results.merge(ui);
    }

    if args.suite != Suite::Ui && args.name.is_none() && args.tag.is_none() {
        results.merge(runner.run_api_suite().await?);
    }

    runner.write_results(&results)?;

    Ok(results.all_passed())
}
