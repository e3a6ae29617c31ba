//! Page objects for the storefront checkout journey
//!
//! Each page wraps a [`Session`](crate::session::Session) and exposes the
//! interactions one screen supports, asserting where the journey lands.

pub mod cart;
pub mod checkout;
pub mod complete;
pub mod home;
pub mod inventory;
pub mod login;
pub mod overview;

pub use cart::CartPage;
pub use checkout::CheckoutPage;
pub use complete::OrderCompletePage;
pub use home::HomePage;
pub use inventory::InventoryPage;
pub use login::LoginPage;
pub use overview::CheckoutOverviewPage;

use regex::Regex;

use crate::error::{E2eError, E2eResult};

/// Regex over the current URL, e.g. `checkout-step-one`
pub(crate) fn url_pattern(fragment: &str) -> E2eResult<Regex> {
    Regex::new(&regex::escape(fragment))
        .map_err(|e| E2eError::AssertionFailed(format!("bad url pattern {:?}: {}", fragment, e)))
}
