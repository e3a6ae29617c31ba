//! Execution of declarative scenario steps against a session

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use storefront_common::random;

use crate::driver::Locator;
use crate::error::{E2eError, E2eResult};
use crate::pages::{overview, LoginPage};
use crate::session::Session;
use crate::spec::{AttributeAssertion, Target, TestStep};

const DEFAULT_STRING_LEN: usize = 8;
const DEFAULT_NUMBER_LEN: usize = 5;

/// Result of executing a scenario step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// Runs steps of one scenario, carrying remembered texts between them
pub struct StepExecutor {
    session: Session,
    screenshot_dir: PathBuf,
    memory: HashMap<String, Vec<String>>,
}

impl StepExecutor {
    pub fn new(session: Session, screenshot_dir: impl Into<PathBuf>) -> Self {
        Self {
            session,
            screenshot_dir: screenshot_dir.into(),
            memory: HashMap::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Texts recorded by `remember` steps
    pub fn remembered(&self, name: &str) -> Option<&[String]> {
        self.memory.get(name).map(Vec::as_slice)
    }

    /// Execute a single step; failures are reported in the result
    pub async fn execute_step(&mut self, step: &TestStep) -> StepResult {
        let start = Instant::now();
        let step_name = step.name();

        debug!("Executing step: {}", step_name);

        let result = self.dispatch(step).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(screenshot_path) => StepResult {
                success: true,
                step_name,
                duration_ms,
                error: None,
                screenshot_path,
            },
            Err(e) => StepResult {
                success: false,
                step_name,
                duration_ms,
                error: Some(e.to_string()),
                screenshot_path: None,
            },
        }
    }

    async fn dispatch(&mut self, step: &TestStep) -> E2eResult<Option<PathBuf>> {
        match step {
            TestStep::Login => {
                LoginPage::new(&self.session).login_as_default_user().await?;
            }
            TestStep::Navigate { url } => {
                self.session.visit(url).await?;
            }
            TestStep::Click { target } => {
                self.session.click(&target.locator()?).await?;
            }
            TestStep::ClickEach { target } => {
                self.click_each(target).await?;
            }
            TestStep::Fill { target, value } => {
                let value = render_template(value)?;
                self.session.fill(&target.locator()?, &value).await?;
            }
            TestStep::Assert {
                target,
                exists,
                visible,
                text,
                text_contains,
                count,
                count_of,
                text_count_of,
                attribute,
                each,
            } => {
                let counted_text = match text_count_of {
                    Some(name) => Some(self.recall(name)?.len().to_string()),
                    None => None,
                };
                let check = ElementCheck {
                    visible: *visible,
                    text: counted_text.as_deref().or(text.as_deref()),
                    text_contains: text_contains.as_deref(),
                    attribute: attribute.as_ref(),
                };
                let expected_count = match count_of {
                    Some(name) => Some(self.recall(name)?.len()),
                    None => *count,
                };
                self.assert(target, *exists, expected_count, &check, *each)
                    .await?;
            }
            TestStep::AssertUrl { contains, matches } => {
                if let Some(fragment) = contains {
                    self.session.expect_url_contains(fragment).await?;
                }
                if let Some(pattern) = matches {
                    let regex = Regex::new(pattern).map_err(|e| {
                        E2eError::SpecParse(format!("bad url pattern {:?}: {}", pattern, e))
                    })?;
                    self.session.expect_url_matches(&regex).await?;
                }
            }
            TestStep::AssertTextAbsent { text } => {
                self.session.expect_text_absent(text).await?;
            }
            TestStep::Remember { target, name } => {
                let locator = target.locator()?;
                self.session.expect_exists(&locator).await?;
                let texts: Vec<String> = self
                    .session
                    .texts(&locator)
                    .await?
                    .iter()
                    .map(|t| normalize_whitespace(t))
                    .collect();
                debug!("remember {} = {:?}", name, texts);
                self.memory.insert(name.clone(), texts);
            }
            TestStep::AssertLinesMatch {
                target,
                name,
                strip,
            } => {
                let expected = self.recall(name)?.to_vec();
                let locator = target.locator()?;
                self.session.expect_count(&locator, expected.len()).await?;
                let actual = self.session.texts(&locator).await?;
                lines_match(&actual, &expected, strip.as_deref())?;
            }
            TestStep::VerifyTotals => {
                overview::verify_totals(&self.session).await?;
            }
            TestStep::Screenshot { name } => {
                let path = self.screenshot(name).await?;
                return Ok(Some(path));
            }
            TestStep::Sleep { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            TestStep::Log { message } => {
                info!("[TEST LOG] {}", message);
            }
        }
        Ok(None)
    }

    fn recall(&self, name: &str) -> E2eResult<&[String]> {
        self.remembered(name).ok_or_else(|| E2eError::StepFailed {
            step: name.to_string(),
            reason: "nothing remembered under this name".to_string(),
        })
    }

    /// Matches are counted once up front, then clicked by position
    async fn click_each(&self, target: &Target) -> E2eResult<()> {
        let locator = target.locator()?;
        let n = self.session.expect_exists(&locator).await?;
        for i in 0..n {
            self.session.click(&locator.clone().nth(i)).await?;
        }
        debug!("clicked {} matches of {}", n, locator);
        Ok(())
    }

    async fn assert(
        &self,
        target: &Target,
        exists: Option<bool>,
        count: Option<usize>,
        check: &ElementCheck<'_>,
        each: bool,
    ) -> E2eResult<()> {
        let locator = target.locator()?;

        match exists {
            Some(true) => {
                self.session.expect_exists(&locator).await?;
            }
            Some(false) => self.session.expect_count(&locator, 0).await?,
            None => {}
        }
        if let Some(n) = count {
            self.session.expect_count(&locator, n).await?;
        }

        if check.is_empty() {
            return Ok(());
        }
        if each {
            let n = self.session.expect_exists(&locator).await?;
            for i in 0..n {
                check.run(&self.session, &locator.clone().nth(i)).await?;
            }
            Ok(())
        } else {
            check.run(&self.session, &locator).await
        }
    }

    async fn screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.screenshot_dir)?;
        let path = screenshot_path(&self.screenshot_dir, name);
        let png = self.session.driver().screenshot().await?;
        std::fs::write(&path, png)?;
        debug!("screenshot saved to {}", path.display());
        Ok(path)
    }
}

/// Checks applied to a single element
struct ElementCheck<'a> {
    visible: bool,
    text: Option<&'a str>,
    text_contains: Option<&'a str>,
    attribute: Option<&'a AttributeAssertion>,
}

impl ElementCheck<'_> {
    fn is_empty(&self) -> bool {
        !self.visible
            && self.text.is_none()
            && self.text_contains.is_none()
            && self.attribute.is_none()
    }

    async fn run(&self, session: &Session, locator: &Locator) -> E2eResult<()> {
        if self.visible {
            session.expect_visible(locator).await?;
        }
        if let Some(text) = self.text {
            session.expect_text(locator, text).await?;
        }
        if let Some(needle) = self.text_contains {
            session.expect_text_contains(locator, needle).await?;
        }
        if let Some(attr) = self.attribute {
            session
                .expect_attribute(locator, &attr.name, &attr.value)
                .await?;
        }
        Ok(())
    }
}

/// `<dir>/<name>.png` with path separators in `name` flattened
pub fn screenshot_path(dir: &Path, name: &str) -> PathBuf {
    let file: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    dir.join(format!("{}.png", file))
}

/// Collapse runs of whitespace into single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Each actual text contains the expected text at the same position, once
/// `strip` is removed from the expected side. Whitespace is normalized.
pub fn lines_match(actual: &[String], expected: &[String], strip: Option<&str>) -> E2eResult<()> {
    if actual.len() != expected.len() {
        return Err(E2eError::AssertionFailed(format!(
            "expected {} lines, found {}",
            expected.len(),
            actual.len()
        )));
    }

    for (i, (actual, expected)) in actual.iter().zip(expected).enumerate() {
        let expected = match strip {
            Some(s) if !s.is_empty() => expected.replace(s, ""),
            _ => expected.clone(),
        };
        let expected = normalize_whitespace(&expected);
        let actual = normalize_whitespace(actual);
        if !actual.contains(&expected) {
            return Err(E2eError::AssertionFailed(format!(
                "line {}: {:?} does not contain {:?}",
                i + 1,
                actual,
                expected
            )));
        }
    }
    Ok(())
}

const TEMPLATE_PATTERN: &str = r"\{\{\s*(random_string|random_number)(?::(\d+))?\s*\}\}";

/// Expand `{{random_string}}`, `{{random_string:N}}` and `{{random_number:N}}`
pub fn render_template(value: &str) -> E2eResult<String> {
    if !value.contains("{{") {
        return Ok(value.to_string());
    }
    let regex = Regex::new(TEMPLATE_PATTERN)
        .map_err(|e| E2eError::SpecParse(format!("template pattern: {}", e)))?;
    Ok(regex
        .replace_all(value, |caps: &Captures| {
            let len = caps.get(2).and_then(|m| m.as_str().parse::<usize>().ok());
            match &caps[1] {
                "random_number" => random::random_number(len.unwrap_or(DEFAULT_NUMBER_LEN)),
                _ => random::random_string(len.unwrap_or(DEFAULT_STRING_LEN)),
            }
        })
        .into_owned())
}
