//! Users API contract checks

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use storefront_common::listing::{ListPage, ListingAggregate, User};
use storefront_common::schema;

use crate::api::{ApiClient, ApiResponse};
use crate::error::{E2eError, E2eResult};

pub const USERS_PATH: &str = "/api/users";

/// Every user of the listing, fetched page by page
#[derive(Debug, Clone)]
pub struct UserListing {
    /// Total reported by page 1
    pub grand_total: u64,
    pub pages_fetched: u64,
    pub users: Vec<User>,
}

/// Fetch all pages of `GET /api/users` and check they add up.
///
/// Any failed request aborts the listing.
pub async fn list_all_users(client: &ApiClient) -> E2eResult<UserListing> {
    let first: ListPage<User> = client.get(USERS_PATH).await?.json()?;
    let mut aggregate = ListingAggregate::new(&first);
    info!(
        "Listing reports {} users on {} pages",
        first.total, first.total_pages
    );

    for n in aggregate.page_numbers() {
        let page: ListPage<User> = client
            .get(&format!("{}?page={}", USERS_PATH, n))
            .await?
            .json()?;
        debug!("page {}: {} users", page.page, page.data.len());

        page.check_leading_pair()?;
        aggregate.absorb(page);
    }

    aggregate.verify()?;

    Ok(UserListing {
        grand_total: aggregate.grand_total(),
        pages_fetched: aggregate.pages_fetched(),
        users: aggregate.into_items(),
    })
}

/// Body of `POST /api/users`
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub job: String,
}

/// Echo returned by `POST /api/users`
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub name: String,
    pub job: String,
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// Create a user and validate the response
pub async fn create_user(
    client: &ApiClient,
    user: &NewUser,
    max_latency: Duration,
) -> E2eResult<CreatedUser> {
    let response = client.post(USERS_PATH, user).await?;
    verify_created(&response, user, max_latency)
}

/// Status, latency, echoed fields, id, timestamp and schema of a create response
pub fn verify_created(
    response: &ApiResponse,
    input: &NewUser,
    max_latency: Duration,
) -> E2eResult<CreatedUser> {
    if response.status != 201 {
        return Err(E2eError::AssertionFailed(format!(
            "expected status 201, got {}",
            response.status
        )));
    }
    if response.duration > max_latency {
        return Err(E2eError::AssertionFailed(format!(
            "response took {} ms, limit {} ms",
            response.duration.as_millis(),
            max_latency.as_millis()
        )));
    }

    schema::validate(&schema::user_schema(), &response.body)?;
    let created: CreatedUser = response.json()?;

    if created.name != input.name || created.job != input.job {
        return Err(E2eError::AssertionFailed(format!(
            "echoed {{name: {:?}, job: {:?}}}, sent {{name: {:?}, job: {:?}}}",
            created.name, created.job, input.name, input.job
        )));
    }
    if created.id.is_empty() {
        return Err(E2eError::AssertionFailed("id is empty".to_string()));
    }
    if parse_created_at(&created.created_at).is_none() {
        return Err(E2eError::AssertionFailed(format!(
            "createdAt {:?} is not a date",
            created.created_at
        )));
    }

    Ok(created)
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date at midnight UTC
pub fn parse_created_at(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().fixed_offset())
}
