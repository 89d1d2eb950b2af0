//! Reddit Listing pagination.
//!
//! **Feature flag:** `listing` (required to use this module)
//!
//! Reddit serves collections (subreddit feeds, user histories, inboxes) as *Listings*: a page of
//! *things* plus an `after` cursor naming the last thing on the page. [`ListingPaginator`] walks
//! that cursor and implements the contracts a [`Stream`](crate::stream::Stream) consumes.
//!
//! Only the Listing envelope is modelled here. Item payloads are left to the caller's own
//! `Deserialize` types, or to [`ThingData`] when only identity is needed.

#![allow(
    clippy::module_name_repetitions,
    reason = "Listing prefixes are intentional for clarity"
)]

use std::marker::PhantomData;

use async_trait::async_trait;
use bon::Builder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{BoolFromInt, serde_as, skip_serializing_none};

use crate::Result;
use crate::client::Client;
use crate::error::Error;
use crate::stream::{CursorPaginator, Resettable};

/// Largest page Reddit serves for a Listing.
pub const MAX_LIMIT: usize = 100;

/// Query parameters shared by every Listing endpoint.
///
/// # Example
///
/// ```
/// use reddit_client_sdk::listing::ListingRequest;
///
/// let request = ListingRequest::builder().limit(25).show("all").build();
/// assert_eq!(request.limit, Some(25));
/// ```
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Builder, Serialize)]
#[non_exhaustive]
pub struct ListingRequest {
    /// Maximum number of things to return (1-100, Reddit defaults to 25).
    pub limit: Option<usize>,
    /// Number of things already seen in this listing, used by Reddit for numbering.
    pub count: Option<usize>,
    /// `all` disables filters such as "hide voted links".
    #[builder(into)]
    pub show: Option<String>,
    /// Ask for unescaped text fields (`&`, `<`, `>` instead of HTML entities).
    #[builder(default = true)]
    #[serde_as(as = "BoolFromInt")]
    pub raw_json: bool,
}

impl Default for ListingRequest {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A single entry of a Listing: the thing's type prefix (`t1` comment, `t3` link, ...) and its
/// payload.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Thing<T> {
    pub kind: String,
    pub data: T,
}

/// Minimal thing payload carrying only identity. Every other field is kept in `extra`.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ThingData {
    /// Base-36 ID, unique within the thing's kind.
    pub id: String,
    /// Fullname (`{kind}_{id}`), unique across kinds.
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One page of a Listing.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    /// Cursor of the next (older) page. `None` once the end of the listing is reached.
    pub after: Option<String>,
    /// Cursor of the previous (newer) page.
    pub before: Option<String>,
    /// Number of things on this page, when Reddit reports it.
    pub dist: Option<u64>,
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingEnvelope<T> {
    kind: String,
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    after: Option<String>,
    before: Option<String>,
    #[serde(default)]
    dist: Option<u64>,
    #[serde(default)]
    #[expect(dead_code, reason = "Present on every Listing but meaningless for OAuth clients")]
    modhash: Option<String>,
    #[serde(default)]
    #[expect(dead_code, reason = "Present on every Listing but unused by pagination")]
    geo_filter: Option<Value>,
    children: Vec<Thing<T>>,
}

impl<T> TryFrom<ListingEnvelope<T>> for Listing<T> {
    type Error = Error;

    fn try_from(envelope: ListingEnvelope<T>) -> Result<Self> {
        if envelope.kind != "Listing" {
            return Err(Error::validation(format!(
                "expected a Listing, received kind {}",
                envelope.kind
            )));
        }

        let data = envelope.data;
        Ok(Self {
            after: data.after,
            before: data.before,
            dist: data.dist,
            children: data.children,
        })
    }
}

/// Walks a Listing from its newest page towards older pages through the `after` cursor.
///
/// [`reset`](Resettable::reset) drops the cursor so the next fetch returns the newest page again.
///
/// # Example
///
/// ```no_run
/// use reddit_client_sdk::client::Client;
/// use reddit_client_sdk::listing::{ListingPaginator, ThingData};
/// use reddit_client_sdk::stream::CursorPaginator as _;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut paginator = ListingPaginator::<ThingData>::new(Client::default(), "/r/rust/new");
///
/// let newest = paginator.fetch().await?;
/// let older = paginator.fetch().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ListingPaginator<T> {
    client: Client,
    path: String,
    request: ListingRequest,
    limit: usize,
    after: Option<String>,
    _item: PhantomData<fn() -> T>,
}

impl<T> ListingPaginator<T> {
    pub fn new<S: Into<String>>(client: Client, path: S) -> Self {
        Self {
            client,
            path: path.into(),
            request: ListingRequest::default(),
            limit: MAX_LIMIT,
            after: None,
            _item: PhantomData,
        }
    }

    /// Uses `request` for every other query parameter. Its `limit` is replaced by the
    /// paginator's own limit on each fetch.
    #[must_use]
    pub fn with_request(mut self, request: ListingRequest) -> Self {
        self.request = request;
        self
    }

    /// Starts from an existing cursor instead of the newest page.
    #[must_use]
    pub fn with_after<S: Into<String>>(mut self, after: S) -> Self {
        self.after = Some(after.into());
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl<T> CursorPaginator for ListingPaginator<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Item = T;

    async fn fetch(&mut self) -> Result<Vec<T>> {
        let mut request = self.request.clone();
        request.limit = Some(self.limit);

        let listing = self
            .client
            .listing::<T>(&self.path, &request, self.after.as_deref())
            .await?;

        self.after = listing.after;
        Ok(listing.children.into_iter().map(|thing| thing.data).collect())
    }

    fn cursor(&self) -> Option<&str> {
        self.after.as_deref()
    }

    fn set_limit(&mut self, limit: usize) {
        #[cfg(feature = "tracing")]
        if limit > MAX_LIMIT {
            tracing::warn!(
                "Supplied {limit} limit, Reddit only allows for maximum {MAX_LIMIT} things per page, defaulting to {MAX_LIMIT}"
            );
        }

        self.limit = limit.clamp(1, MAX_LIMIT);
    }

    fn limit(&self) -> usize {
        self.limit
    }
}

impl<T> Resettable for ListingPaginator<T> {
    fn reset(&mut self) {
        self.after = None;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ToQueryParams as _;

    #[test]
    fn request_serializes_raw_json_as_int() {
        let request = ListingRequest::builder().limit(10).build();

        assert_eq!(request.query_params(Some("t3_abc")), "?limit=10&raw_json=1&after=t3_abc");
    }

    #[test]
    fn envelope_converts_to_listing() {
        let envelope: ListingEnvelope<ThingData> = serde_json::from_value(json!({
            "kind": "Listing",
            "data": {
                "after": "t3_b",
                "before": null,
                "dist": 2,
                "modhash": "",
                "geo_filter": null,
                "children": [
                    { "kind": "t3", "data": { "id": "a", "name": "t3_a", "title": "first" } },
                    { "kind": "t3", "data": { "id": "b", "name": "t3_b" } }
                ]
            }
        }))
        .unwrap();

        let listing = Listing::try_from(envelope).unwrap();

        assert_eq!(listing.after.as_deref(), Some("t3_b"));
        assert_eq!(listing.dist, Some(2));
        assert_eq!(listing.children.len(), 2);
        assert_eq!(listing.children[0].kind, "t3");
        assert_eq!(listing.children[0].data.extra["title"], "first");
    }

    #[test]
    fn non_listing_envelope_is_rejected() {
        let envelope: ListingEnvelope<ThingData> = serde_json::from_value(json!({
            "kind": "t2",
            "data": { "after": null, "before": null, "children": [] }
        }))
        .unwrap();

        let err = Listing::try_from(envelope).unwrap_err();

        assert_eq!(err.kind(), crate::error::Kind::Validation);
    }

    #[test]
    fn set_limit_clamps_to_page_bounds() {
        let mut paginator = ListingPaginator::<ThingData>::new(Client::default(), "/r/rust/new");

        paginator.set_limit(500);
        assert_eq!(paginator.limit(), MAX_LIMIT);

        paginator.set_limit(0);
        assert_eq!(paginator.limit(), 1);
    }

    #[test]
    fn reset_clears_cursor() {
        let mut paginator =
            ListingPaginator::<ThingData>::new(Client::default(), "/r/rust/new").with_after("t3_z");
        assert!(paginator.has_cursor());

        paginator.reset();

        assert_eq!(paginator.cursor(), None);
    }
}
