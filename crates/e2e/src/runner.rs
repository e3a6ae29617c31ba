//! Test runner that drives scenarios through fresh browser sessions

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use storefront_common::{random, EnvConfig};

use crate::api::ApiClient;
use crate::browser::{BrowserOptions, CdpLauncher};
use crate::driver::Launcher;
use crate::error::{E2eError, E2eResult};
use crate::session::Session;
use crate::spec::{TestSpec, TestStep};
use crate::steps::{StepExecutor, StepResult};
use crate::users::{self, NewUser};

/// Bound on a single REST call, independent of the latency assertion
const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    /// Uncaught exceptions thrown by the application
    #[serde(default)]
    pub page_errors: Vec<String>,
    pub error: Option<String>,
}

impl TestResult {
    fn errored(name: &str, error: &E2eError) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration_ms: 0,
            steps: vec![],
            page_errors: vec![],
            error: Some(error.to_string()),
        }
    }
}

/// Result of running all tests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn from_results(results: Vec<TestResult>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            skipped: 0,
            duration_ms,
            results,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Fold another suite's results into this one
    pub fn merge(&mut self, other: TestSuiteResult) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
        self.duration_ms += other.duration_ms;
        self.results.extend(other.results);
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub env: Arc<EnvConfig>,
    pub browser: BrowserOptions,
    pub specs_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Scenarios run at once
    pub workers: usize,

    /// Fail a scenario when the application throws uncaught exceptions
    pub fail_on_page_errors: bool,
}

impl RunnerConfig {
    /// Defaults for an environment; browser viewport and page load bound
    /// come from its config
    pub fn new(env: EnvConfig) -> Self {
        let browser = BrowserOptions {
            viewport: env.viewport,
            page_load_timeout: env.timeouts.page_load(),
            ..BrowserOptions::default()
        };
        Self {
            env: Arc::new(env),
            browser,
            specs_dir: PathBuf::from("crates/e2e/specs"),
            output_dir: PathBuf::from("test-results"),
            workers: 1,
            fail_on_page_errors: false,
        }
    }
}

/// Main E2E test runner
pub struct TestRunner {
    config: RunnerConfig,
    launcher: Arc<dyn Launcher>,
}

impl TestRunner {
    /// Runner launching a local Chrome per scenario
    pub fn new(config: RunnerConfig) -> Self {
        let launcher = Arc::new(CdpLauncher::new(config.browser.clone()));
        Self::with_launcher(config, launcher)
    }

    /// Runner with a custom driver source
    pub fn with_launcher(config: RunnerConfig, launcher: Arc<dyn Launcher>) -> Self {
        Self { config, launcher }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run all scenarios in the specs directory
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        self.run_specs(&specs).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        let filtered: Vec<TestSpec> = TestSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
        self.run_specs(&filtered).await
    }

    /// Run a specific scenario by name
    pub async fn run_test(&self, name: &str) -> E2eResult<TestResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecParse(format!("Test not found: {}", name)))?;

        self.run_spec(&spec).await
    }

    /// Run a list of scenarios, at most `workers` at once; results keep input order
    pub async fn run_specs(&self, specs: &[TestSpec]) -> E2eResult<TestSuiteResult> {
        let start = Instant::now();
        let workers = self.config.workers.max(1);

        info!("Running {} test(s) with {} worker(s)...", specs.len(), workers);

        let results: Vec<TestResult> = stream::iter(specs)
            .map(|spec| async move {
                match self.run_spec(spec).await {
                    Ok(result) => result,
                    Err(e) => TestResult::errored(&spec.name, &e),
                }
            })
            .buffered(workers)
            .collect()
            .await;

        for result in &results {
            if result.success {
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        let suite = TestSuiteResult::from_results(results, start.elapsed().as_millis() as u64);
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );
        Ok(suite)
    }

    /// Run a single scenario on a fresh browser session
    pub async fn run_spec(&self, spec: &TestSpec) -> E2eResult<TestResult> {
        let start = Instant::now();
        debug!("Running test: {}", spec.name);

        let driver = self.launcher.launch().await?;
        let session = Session::new(driver.clone(), self.config.env.clone());
        let mut executor = StepExecutor::new(session, self.screenshot_dir());

        let mut step_results = Vec::new();
        let mut test_error: Option<String> = None;

        for step in &spec.steps {
            let mut result = executor.execute_step(step).await;

            if !result.success {
                test_error = result.error.clone();
                result.screenshot_path = self.failure_screenshot(&mut executor, spec).await;
                step_results.push(result);
                break; // Stop on first failure
            }

            step_results.push(result);
        }

        let page_errors = driver.page_errors();
        if !page_errors.is_empty() {
            if self.config.fail_on_page_errors && test_error.is_none() {
                test_error = Some(format!(
                    "{} uncaught page error(s): {}",
                    page_errors.len(),
                    page_errors.join("; ")
                ));
            } else {
                warn!(
                    "Ignoring {} uncaught page error(s) in {}",
                    page_errors.len(),
                    spec.name
                );
            }
        }

        if let Err(e) = driver.close().await {
            warn!("Failed to close browser for {}: {}", spec.name, e);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let success = test_error.is_none();

        Ok(TestResult {
            name: spec.name.clone(),
            success,
            duration_ms,
            steps: step_results,
            page_errors,
            error: test_error,
        })
    }

    /// The users API contract: full paginated listing, then one creation
    pub async fn run_api_suite(&self) -> E2eResult<TestSuiteResult> {
        let start = Instant::now();
        let env = &self.config.env;
        let client = ApiClient::new(&env.env.api, API_REQUEST_TIMEOUT)?;

        info!("Running users API checks against {}", client.base_url());

        let listing = timed("list users", "get_all_pages", async {
            let listing = users::list_all_users(&client).await?;
            info!(
                "Fetched {} users over {} pages",
                listing.users.len(),
                listing.pages_fetched
            );
            Ok::<(), E2eError>(())
        })
        .await;

        let input = NewUser {
            name: random::random_string(8),
            job: random::random_string(8),
        };
        let create = timed("create user", "post_user", async {
            let created = users::create_user(&client, &input, env.timeouts.api_latency()).await?;
            info!("Created user {} at {}", created.id, created.created_at);
            Ok::<(), E2eError>(())
        })
        .await;

        let suite = TestSuiteResult::from_results(
            vec![listing, create],
            start.elapsed().as_millis() as u64,
        );
        info!(
            "API Results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );
        Ok(suite)
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }

    fn screenshot_dir(&self) -> PathBuf {
        self.config.output_dir.join("screenshots")
    }

    async fn failure_screenshot(
        &self,
        executor: &mut StepExecutor,
        spec: &TestSpec,
    ) -> Option<PathBuf> {
        let step = TestStep::Screenshot {
            name: format!("{}-failure", spec.name),
        };
        let result = executor.execute_step(&step).await;
        if !result.success {
            warn!(
                "No failure screenshot for {}: {}",
                spec.name,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        result.screenshot_path
    }
}

/// Run a single-step test outside the browser
async fn timed<F>(name: &str, step_name: &str, check: F) -> TestResult
where
    F: std::future::Future<Output = E2eResult<()>>,
{
    let start = Instant::now();
    let outcome = check.await;
    let duration_ms = start.elapsed().as_millis() as u64;
    let error = outcome.err().map(|e| e.to_string());

    if let Some(e) = &error {
        error!("✗ {} - {}", name, e);
    } else {
        info!("✓ {} ({} ms)", name, duration_ms);
    }

    TestResult {
        name: name.to_string(),
        success: error.is_none(),
        duration_ms,
        steps: vec![StepResult {
            success: error.is_none(),
            step_name: step_name.to_string(),
            duration_ms,
            error: error.clone(),
            screenshot_path: None,
        }],
        page_errors: vec![],
        error,
    }
}
