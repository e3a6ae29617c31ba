//! Storefront Common Library
//!
//! Browser-free pieces of the storefront end-to-end suite: environment
//! configuration, listing aggregation, schema checks, price reconciliation
//! and random test data.

pub mod config;
pub mod error;
pub mod listing;
pub mod pricing;
pub mod random;
pub mod schema;

// Re-export commonly used types
pub use config::{ApiConfig, Credentials, EnvConfig, Timeouts, Viewport};
pub use error::{Error, Result};
pub use listing::{ListPage, ListingAggregate, User};
pub use pricing::{CartLine, PriceSummary};
