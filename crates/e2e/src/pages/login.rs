//! Login form

use crate::driver::Locator;
use crate::error::E2eResult;
use crate::selectors::{login, routes};
use crate::session::Session;

pub struct LoginPage<'a> {
    session: &'a Session,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Open the login form at the storefront root
    pub async fn goto(&self) -> E2eResult<()> {
        self.session.visit(routes::LOGIN).await
    }

    /// Fill the credentials and submit
    pub async fn login(&self, username: &str, password: &str) -> E2eResult<()> {
        self.session
            .fill(&Locator::test_id(login::USERNAME), username)
            .await?;
        self.session
            .fill(&Locator::test_id(login::PASSWORD), password)
            .await?;
        self.session.click(&Locator::test_id(login::SUBMIT)).await
    }

    /// Start from a clean session and sign in with the environment's user
    pub async fn login_as_default_user(&self) -> E2eResult<()> {
        let credentials = self.session.config().env.login.clone();

        self.session.driver().clear_session().await?;
        self.goto().await?;
        self.login(&credentials.username, &credentials.password)
            .await?;

        let inventory = self.session.config().url(routes::INVENTORY);
        self.session.expect_url_contains(&inventory).await
    }
}
