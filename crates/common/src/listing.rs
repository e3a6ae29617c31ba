//! Paginated listing aggregation
//!
//! Page 1 of a listing reports the grand total and the page count. Every
//! page is then fetched in order and folded into a [`ListingAggregate`],
//! which checks that the pages add up to the reported total.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One page of a paginated listing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
    pub data: Vec<T>,
}

/// A listed user. Only the fields the checks use are typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub last_name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Items that expose a last name for the adjacent-items smoke check
pub trait LastName {
    fn last_name(&self) -> &str;
}

impl LastName for User {
    fn last_name(&self) -> &str {
        &self.last_name
    }
}

impl<T: LastName> ListPage<T> {
    /// The first two items on a page must not share a last name.
    ///
    /// Pages with fewer than two items pass.
    pub fn check_leading_pair(&self) -> Result<()> {
        match (self.data.first(), self.data.get(1)) {
            (Some(a), Some(b)) if a.last_name() == b.last_name() => Err(Error::Listing(format!(
                "page {}: first two items share last name {:?}",
                self.page,
                a.last_name()
            ))),
            _ => Ok(()),
        }
    }
}

/// Running aggregate over every fetched page
#[derive(Debug, Clone)]
pub struct ListingAggregate<T> {
    grand_total: u64,
    total_pages: u64,
    running_total: u64,
    pages_fetched: u64,
    items: Vec<T>,
}

impl<T> ListingAggregate<T> {
    /// Start from the totals reported by page 1
    pub fn new<U>(first: &ListPage<U>) -> Self {
        Self {
            grand_total: first.total,
            total_pages: first.total_pages,
            running_total: 0,
            pages_fetched: 0,
            items: Vec::new(),
        }
    }

    /// Page numbers to fetch, `1..=total_pages`
    pub fn page_numbers(&self) -> std::ops::RangeInclusive<u64> {
        1..=self.total_pages
    }

    /// Fold one page in, in page order
    pub fn absorb(&mut self, page: ListPage<T>) {
        self.running_total += page.data.len() as u64;
        self.pages_fetched += 1;
        self.items.extend(page.data);
    }

    pub fn grand_total(&self) -> u64 {
        self.grand_total
    }

    pub fn running_total(&self) -> u64 {
        self.running_total
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Running total and concatenated length both equal the grand total
    pub fn verify(&self) -> Result<()> {
        if self.running_total != self.grand_total {
            return Err(Error::Listing(format!(
                "summed page counts {} != reported total {}",
                self.running_total, self.grand_total
            )));
        }
        if self.items.len() as u64 != self.grand_total {
            return Err(Error::Listing(format!(
                "collected {} items != reported total {}",
                self.items.len(),
                self.grand_total
            )));
        }
        Ok(())
    }
}
