//! Browser driver abstraction
//!
//! Everything above this module talks to a [`Driver`]: the live
//! implementation speaks CDP (see [`crate::browser`]), tests plug in an
//! in-memory shop. Elements are addressed with a [`Locator`], a chain of CSS
//! selectors where each step searches inside the matches of the previous one.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;
use crate::selectors::TEST_ID_ATTR;

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// CSS selector evaluated against the previous step's matches
    pub css: String,

    /// Keep only the n-th match (0-based)
    pub nth: Option<usize>,
}

/// Element query, resolved fresh on every driver call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    segments: Vec<Segment>,
}

impl Locator {
    /// Match elements by CSS selector
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                css: selector.into(),
                nth: None,
            }],
        }
    }

    /// Match elements by their test identifier attribute
    pub fn test_id(id: &str) -> Self {
        Self::css(test_id_css(id))
    }

    /// Narrow the last step to its n-th match
    pub fn nth(mut self, index: usize) -> Self {
        if let Some(last) = self.segments.last_mut() {
            last.nth = Some(index);
        }
        self
    }

    /// Search by CSS inside the current matches
    pub fn find(&self, selector: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment {
            css: selector.into(),
            nth: None,
        });
        Self { segments }
    }

    /// Search by test identifier inside the current matches
    pub fn find_test_id(&self, id: &str) -> Self {
        self.find(test_id_css(id))
    }

    /// Nest this locator's chain under `parent`
    pub fn within(self, parent: &Locator) -> Self {
        let mut segments = parent.segments.clone();
        segments.extend(self.segments);
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Wrap `body` in a script where `els` holds the resolved elements.
    ///
    /// `body` must `return` a JSON-serializable value.
    pub fn script(&self, body: &str) -> String {
        let mut js = String::from("(() => {\n  let els = [document];\n");
        for segment in &self.segments {
            js.push_str(&format!(
                "  els = els.flatMap(e => Array.from(e.querySelectorAll({})));\n",
                js_string(&segment.css)
            ));
            if let Some(n) = segment.nth {
                js.push_str(&format!("  els = els.length > {n} ? [els[{n}]] : [];\n"));
            }
        }
        js.push_str("  ");
        js.push_str(body);
        js.push_str("\n})()");
        js
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s.nth {
                Some(n) => format!("{} >> nth={}", s.css, n),
                None => s.css.clone(),
            })
            .collect();
        write!(f, "{}", parts.join(" >> "))
    }
}

/// CSS selector for a test identifier
pub fn test_id_css(id: &str) -> String {
    format!("[{}=\"{}\"]", TEST_ID_ATTR, id)
}

/// Quote a Rust string as a JavaScript string literal
pub fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Low-level browser operations.
///
/// Calls do not wait: a locator with no match yields `0`, an empty list or
/// `None`. Waiting lives in [`crate::session::Session`].
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    async fn count(&self, locator: &Locator) -> E2eResult<usize>;

    /// `textContent` of every match, in document order
    async fn texts(&self, locator: &Locator) -> E2eResult<Vec<String>>;

    /// Attribute of the first match
    async fn attribute(&self, locator: &Locator, name: &str) -> E2eResult<Option<String>>;

    /// Whether the first match is rendered
    async fn is_visible(&self, locator: &Locator) -> E2eResult<bool>;

    /// Click the first match
    async fn click(&self, locator: &Locator) -> E2eResult<()>;

    /// Replace the value of the first matching input by typing
    async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()>;

    /// Number of elements whose own text contains `text` (case-insensitive)
    async fn count_text(&self, text: &str) -> E2eResult<usize>;

    /// Drop cookies, local storage and session storage
    async fn clear_session(&self) -> E2eResult<()>;

    /// PNG of the full page
    async fn screenshot(&self) -> E2eResult<Vec<u8>>;

    /// Uncaught exceptions thrown by the page so far
    fn page_errors(&self) -> Vec<String> {
        Vec::new()
    }

    async fn close(&self) -> E2eResult<()> {
        Ok(())
    }
}

/// Creates a fresh, isolated driver per scenario
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self) -> E2eResult<Arc<dyn Driver>>;
}
