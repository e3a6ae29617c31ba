//! Order confirmation

use crate::driver::Locator;
use crate::error::E2eResult;
use crate::selectors::complete;
use crate::session::Session;

pub struct OrderCompletePage<'a> {
    session: &'a Session,
}

impl<'a> OrderCompletePage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// The thank-you header and the way back are shown
    pub async fn verify_completion(&self) -> E2eResult<()> {
        self.session
            .expect_text_contains(&Locator::test_id(complete::HEADER), complete::THANK_YOU)
            .await?;
        self.session
            .expect_visible(&Locator::test_id(complete::BACK_HOME))
            .await
    }
}
