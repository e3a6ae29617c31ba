//! Checkout step two: order summary and totals

use tracing::{debug, info};

use storefront_common::{CartLine, PriceSummary};

use crate::driver::Locator;
use crate::error::E2eResult;
use crate::selectors::{inventory, overview, routes};
use crate::session::Session;

use super::url_pattern;

pub struct CheckoutOverviewPage<'a> {
    session: &'a Session,
}

impl<'a> CheckoutOverviewPage<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Recompute subtotal, tax and total from the listed prices and check the
    /// summary labels show them.
    pub async fn verify_prices_match_cart(&self) -> E2eResult<PriceSummary> {
        verify_totals(self.session).await
    }

    /// Place the order
    pub async fn finish_order(&self) -> E2eResult<()> {
        self.session
            .click(&Locator::test_id(overview::FINISH))
            .await?;
        self.session
            .expect_url_matches(&url_pattern(routes::CHECKOUT_COMPLETE)?)
            .await
    }
}

/// Price reconciliation against whatever overview the session shows
pub async fn verify_totals(session: &Session) -> E2eResult<PriceSummary> {
    let items = Locator::test_id(inventory::ITEM);
    let count = session.count(&items).await?;

    let mut lines = Vec::with_capacity(count);
    for i in 0..count {
        let item = items.clone().nth(i);
        let name = session.text(&item.find_test_id(inventory::NAME)).await?;
        let price = session.text(&item.find_test_id(inventory::PRICE)).await?;
        let line = CartLine::parse(name.trim(), &price)?;
        debug!("{} at {}", line.name, line.price);
        lines.push(line);
    }

    let summary = PriceSummary::from_lines(&lines);
    info!(
        "Computed subtotal {} tax {} total {}",
        summary.subtotal_text(),
        summary.tax_text(),
        summary.total_text()
    );

    session
        .expect_text_contains(&Locator::test_id(overview::SUBTOTAL), &summary.subtotal_text())
        .await?;
    session
        .expect_text_contains(&Locator::test_id(overview::TAX), &summary.tax_text())
        .await?;
    session
        .expect_text_contains(&Locator::test_id(overview::TOTAL), &summary.total_text())
        .await?;

    Ok(summary)
}
