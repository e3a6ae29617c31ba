//! Product lookups by name on the inventory page

use crate::driver::Locator;
use crate::error::E2eResult;
use crate::selectors::inventory;
use crate::session::Session;

pub struct HomePage<'a> {
    session: &'a Session,
}

impl<'a> HomePage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Add the product whose card mentions `name`
    pub async fn add_product_to_cart(&self, name: &str) -> E2eResult<()> {
        let items = Locator::test_id(inventory::ITEM);
        let index = self.session.expect_any_text_contains(&items, name).await?;

        let button = items.nth(index).find(inventory::BUTTON_CSS);
        self.session
            .expect_text(&button, inventory::ADD_TO_CART_TEXT)
            .await?;
        self.session.click(&button).await?;
        self.session
            .expect_text(&button, inventory::REMOVE_TEXT)
            .await
    }

    /// How many elements show `text`
    pub async fn count_text(&self, text: &str) -> E2eResult<usize> {
        self.session.driver().count_text(text).await
    }
}

/// Product name as used in per-product test ids
pub fn product_slug(name: &str) -> String {
    name.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}
