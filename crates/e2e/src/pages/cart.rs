//! Shopping cart

use crate::driver::Locator;
use crate::error::E2eResult;
use crate::selectors::{cart, checkout, inventory, routes};
use crate::session::Session;

use super::url_pattern;

pub struct CartPage<'a> {
    session: &'a Session,
}

impl<'a> CartPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Open the cart through the header icon
    pub async fn open_cart(&self) -> E2eResult<()> {
        self.session.click(&Locator::test_id(cart::LINK)).await?;
        self.session
            .expect_url_matches(&url_pattern(routes::CART)?)
            .await
    }

    /// A cart line with this product name is visible
    pub async fn verify_item_in_cart(&self, product_name: &str) -> E2eResult<()> {
        let names = Locator::test_id(inventory::NAME);
        let index = self
            .session
            .expect_any_text_contains(&names, product_name)
            .await?;
        self.session.expect_visible(&names.nth(index)).await
    }

    pub async fn verify_cart_items(&self, expected_count: usize) -> E2eResult<()> {
        self.session
            .expect_count(&Locator::test_id(inventory::ITEM), expected_count)
            .await
    }

    /// Proceed to the first checkout step
    pub async fn checkout(&self) -> E2eResult<()> {
        self.session.click(&Locator::test_id(cart::CHECKOUT)).await?;
        self.session
            .expect_url_matches(&url_pattern(routes::CHECKOUT_STEP_ONE)?)
            .await?;
        self.session
            .expect_exists(&Locator::test_id(checkout::CONTINUE))
            .await?;
        Ok(())
    }
}
