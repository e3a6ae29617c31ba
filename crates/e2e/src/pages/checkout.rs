//! Checkout step one: customer information

use crate::driver::Locator;
use crate::error::E2eResult;
use crate::selectors::{checkout, routes};
use crate::session::Session;

use super::url_pattern;

pub struct CheckoutPage<'a> {
    session: &'a Session,
}

impl<'a> CheckoutPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Enter the customer details and continue to the summary
    pub async fn fill_personal_info(
        &self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> E2eResult<()> {
        self.session
            .fill(&Locator::test_id(checkout::FIRST_NAME), first_name)
            .await?;
        self.session
            .fill(&Locator::test_id(checkout::LAST_NAME), last_name)
            .await?;
        self.session
            .fill(&Locator::test_id(checkout::POSTAL_CODE), postal_code)
            .await?;

        self.session
            .click(&Locator::test_id(checkout::CONTINUE))
            .await?;
        self.session
            .expect_url_matches(&url_pattern(routes::CHECKOUT_STEP_TWO)?)
            .await
    }
}
