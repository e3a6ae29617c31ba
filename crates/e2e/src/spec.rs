//! Declarative YAML scenarios

use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::driver::Locator;
use crate::error::{E2eError, E2eResult};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<TestStep>,
}

/// Element addressed by a step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Value of the `data-test` attribute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,

    /// Raw CSS selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// Keep only the n-th match (0-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth: Option<usize>,

    /// Search inside the matches of another target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<Box<Target>>,
}

impl Target {
    pub fn test_id(id: &str) -> Self {
        Self {
            test_id: Some(id.to_string()),
            ..Self::default()
        }
    }

    pub fn selector(css: &str) -> Self {
        Self {
            selector: Some(css.to_string()),
            ..Self::default()
        }
    }

    /// Resolve to a locator; exactly one of `test_id` and `selector` must be set
    pub fn locator(&self) -> E2eResult<Locator> {
        let mut locator = match (&self.test_id, &self.selector) {
            (Some(id), None) => Locator::test_id(id),
            (None, Some(css)) => Locator::css(css.as_str()),
            (Some(_), Some(_)) => {
                return Err(E2eError::SpecParse(
                    "target has both test_id and selector".to_string(),
                ))
            }
            (None, None) => {
                return Err(E2eError::SpecParse(
                    "target needs a test_id or a selector".to_string(),
                ))
            }
        };

        if let Some(n) = self.nth {
            locator = locator.nth(n);
        }
        if let Some(parent) = &self.within {
            locator = locator.within(&parent.locator()?);
        }
        Ok(locator)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.within {
            write!(f, "{} >> ", parent)?;
        }
        match (&self.test_id, &self.selector) {
            (Some(id), _) => write!(f, "test_id={}", id)?,
            (None, Some(css)) => write!(f, "{}", css)?,
            (None, None) => write!(f, "?")?,
        }
        if let Some(n) = self.nth {
            write!(f, "[{}]", n)?;
        }
        Ok(())
    }
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Sign in with the environment's default user on a clean session
    Login,

    /// Navigate to a route (relative to the base URL) or an absolute URL
    Navigate { url: String },

    /// Click the first match
    Click { target: Target },

    /// Click every match, in document order
    ClickEach { target: Target },

    /// Type into an input; `value` may hold `{{random_string}}` style templates
    Fill { target: Target, value: String },

    /// Assert something about the matches of a target
    Assert {
        target: Target,
        #[serde(default)]
        exists: Option<bool>,
        /// Require the match to be rendered
        #[serde(default)]
        visible: bool,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        text_contains: Option<String>,
        #[serde(default)]
        count: Option<usize>,
        /// Count equals the number of texts remembered under this name
        #[serde(default)]
        count_of: Option<String>,
        /// Text equals the number of texts remembered under this name
        #[serde(default)]
        text_count_of: Option<String>,
        #[serde(default)]
        attribute: Option<AttributeAssertion>,
        /// Apply `visible`, `text` and `text_contains` to every match
        #[serde(default)]
        each: bool,
    },

    /// Assert on the current URL
    AssertUrl {
        #[serde(default)]
        contains: Option<String>,
        #[serde(default)]
        matches: Option<String>,
    },

    /// No element on the page shows this text
    AssertTextAbsent { text: String },

    /// Record the text of every match under `name`
    Remember { target: Target, name: String },

    /// The i-th match contains the i-th remembered text
    AssertLinesMatch {
        target: Target,
        name: String,
        /// Removed from each remembered text before comparing
        #[serde(default)]
        strip: Option<String>,
    },

    /// Reconcile the order overview's subtotal, tax and total
    VerifyTotals,

    /// Save a full-page screenshot
    Screenshot { name: String },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Log a message (for debugging)
    Log { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeAssertion {
    pub name: String,
    pub value: String,
}

impl TestStep {
    /// Short label used in results and logs
    pub fn name(&self) -> String {
        match self {
            TestStep::Login => "login".to_string(),
            TestStep::Navigate { url } => format!("navigate:{}", url),
            TestStep::Click { target } => format!("click:{}", target),
            TestStep::ClickEach { target } => format!("click_each:{}", target),
            TestStep::Fill { target, .. } => format!("fill:{}", target),
            TestStep::Assert { target, .. } => format!("assert:{}", target),
            TestStep::AssertUrl { contains, matches } => format!(
                "assert_url:{}",
                contains.as_deref().or(matches.as_deref()).unwrap_or("")
            ),
            TestStep::AssertTextAbsent { text } => format!("assert_text_absent:{}", text),
            TestStep::Remember { name, .. } => format!("remember:{}", name),
            TestStep::AssertLinesMatch { name, .. } => format!("assert_lines_match:{}", name),
            TestStep::VerifyTotals => "verify_totals".to_string(),
            TestStep::Screenshot { name } => format!("screenshot:{}", name),
            TestStep::Sleep { ms } => format!("sleep:{}ms", ms),
            TestStep::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }

    fn target(&self) -> Option<&Target> {
        match self {
            TestStep::Click { target }
            | TestStep::ClickEach { target }
            | TestStep::Fill { target, .. }
            | TestStep::Assert { target, .. }
            | TestStep::Remember { target, .. }
            | TestStep::AssertLinesMatch { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Reject steps that could never run
    pub fn validate(&self) -> E2eResult<()> {
        if let Some(target) = self.target() {
            target.locator()?;
        }

        if let TestStep::AssertUrl { contains, matches } = self {
            match (contains, matches) {
                (None, None) => {
                    return Err(E2eError::SpecParse(
                        "assert_url needs contains or matches".to_string(),
                    ))
                }
                (_, Some(pattern)) => {
                    Regex::new(pattern).map_err(|e| {
                        E2eError::SpecParse(format!("bad url pattern {:?}: {}", pattern, e))
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl TestSpec {
    /// Parse a scenario from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let spec: Self = serde_yaml::from_str(yaml)?;
        for (i, step) in spec.steps.iter().enumerate() {
            step.validate().map_err(|e| {
                E2eError::SpecParse(format!("{} step {}: {}", spec.name, i + 1, e))
            })?;
        }
        Ok(spec)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all scenarios from a directory, ordered by file name
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            let spec = Self::from_file(entry.path())?;
            specs.push(spec);
        }

        Ok(specs)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }
}
