//! Product list shown after login

use tracing::debug;

use crate::driver::Locator;
use crate::error::E2eResult;
use crate::selectors::{cart, inventory, routes};
use crate::session::Session;

use super::url_pattern;

pub struct InventoryPage<'a> {
    session: &'a Session,
}

impl<'a> InventoryPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// All product cards
    pub fn items(&self) -> Locator {
        Locator::test_id(inventory::ITEM)
    }

    /// Every card shows an image, a description, a `$` price and an
    /// "Add to cart" button. Returns the number of cards.
    pub async fn verify_product_list(&self) -> E2eResult<usize> {
        let count = self.session.expect_exists(&self.items()).await?;

        for i in 0..count {
            let item = self.items().nth(i);
            self.session
                .expect_visible(&item.find(inventory::IMG_CSS))
                .await?;
            self.session
                .expect_visible(&item.find_test_id(inventory::DESC))
                .await?;
            self.session
                .expect_text_contains(&item.find_test_id(inventory::PRICE), "$")
                .await?;
            self.session
                .expect_text(&item.find(inventory::BUTTON_CSS), inventory::ADD_TO_CART_TEXT)
                .await?;
        }

        debug!("{} products verified", count);
        Ok(count)
    }

    /// Add every product to the cart, returning how many were added
    pub async fn add_all_items(&self) -> E2eResult<usize> {
        let count = self.session.count(&self.items()).await?;

        for i in 0..count {
            let button = self.items().nth(i).find(inventory::BUTTON_CSS);
            self.session
                .expect_text(&button, inventory::ADD_TO_CART_TEXT)
                .await?;
            self.session.click(&button).await?;
            self.session
                .expect_text(&button, inventory::REMOVE_TEXT)
                .await?;
        }

        Ok(count)
    }

    /// Check the cart badge and open the cart
    pub async fn go_to_cart(&self, expected_count: usize) -> E2eResult<()> {
        self.session
            .expect_text(&Locator::test_id(cart::BADGE), &expected_count.to_string())
            .await?;
        self.session.click(&Locator::test_id(cart::LINK)).await?;
        self.session
            .expect_url_matches(&url_pattern(routes::CART)?)
            .await
    }
}
