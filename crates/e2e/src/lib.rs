//! Storefront E2E Test Framework
//!
//! This crate drives the storefront demo end to end:
//! - Launches Chrome over the DevTools protocol, one browser per scenario
//! - Parses declarative YAML scenarios and runs them step by step
//! - Exposes typed page objects for the checkout journey
//! - Checks the users REST API (pagination, creation contract)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── Launcher::launch() -> Arc<dyn Driver>                │
//! │    ├── run_spec(spec: TestSpec) -> TestResult               │
//! │    ├── run_api_suite() -> TestSuiteResult                   │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Session (auto-waiting expectations over a Driver)          │
//! │    ├── pages::{LoginPage, InventoryPage, CartPage, ...}     │
//! │    └── steps::StepExecutor                                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestSpec (YAML)                                            │
//! │    ├── name, description, tags                              │
//! │    └── steps: [Step]                                        │
//! │          ├── login / navigate { url }                       │
//! │          ├── click / click_each { target }                  │
//! │          ├── fill { target, value }                         │
//! │          ├── assert { target, visible?, text?, count? }     │
//! │          ├── remember / assert_lines_match                  │
//! │          └── verify_totals / screenshot { name }            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod browser;
pub mod driver;
pub mod error;
pub mod pages;
pub mod runner;
pub mod selectors;
pub mod session;
pub mod spec;
pub mod steps;
pub mod users;

pub use driver::{Driver, Launcher, Locator};
pub use error::{E2eError, E2eResult};
pub use runner::{RunnerConfig, TestRunner};
pub use session::Session;
pub use spec::{Target, TestSpec, TestStep};
