//! Minimal Reddit HTTP client.
//!
//! **Feature flag:** `listing` (required to use this module)
//!
//! Only what the [`listing`](crate::listing) paginator needs is exposed: authenticated GETs of
//! Listing endpoints. Obtaining an OAuth token is up to the caller; a token passed through
//! [`Config::access_token`] is sent as a bearer token on every request.

use std::time::Duration;

use bon::Builder;
use reqwest::{
    Client as ReqwestClient, Method,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use secrecy::{ExposeSecret as _, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::Result;
use crate::ToQueryParams as _;
use crate::listing::{Listing, ListingEnvelope, ListingRequest};

/// Public, unauthenticated host.
pub const PUBLIC_HOST: &str = "https://www.reddit.com";
/// Host that accepts OAuth bearer tokens.
pub const OAUTH_HOST: &str = "https://oauth.reddit.com";

const DEFAULT_USER_AGENT: &str = concat!(
    "rust:",
    env!("CARGO_PKG_NAME"),
    ":v",
    env!("CARGO_PKG_VERSION")
);

/// Configuration for [`Client`]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// Sent as `User-Agent`. Reddit throttles generic agents heavily, so set something unique.
    #[builder(into, default = DEFAULT_USER_AGENT.to_owned())]
    user_agent: String,
    /// OAuth bearer token sent as `Authorization`.
    #[builder(into)]
    access_token: Option<SecretString>,
    /// Transport timeout for each request. No timeout when absent.
    timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Client for Reddit's Listing endpoints.
///
/// # Example
///
/// ```no_run
/// use reddit_client_sdk::client::{Client, Config};
/// use reddit_client_sdk::listing::{ListingRequest, ThingData};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::builder()
///     .user_agent("linux:my-bot:v0.1 (by /u/someone)")
///     .access_token("token".to_owned())
///     .build();
/// let client = Client::with_config(config)?;
///
/// let request = ListingRequest::builder().limit(10).build();
/// let listing = client.listing::<ThingData>("/r/rust/new", &request, None).await?;
///
/// for thing in listing.children {
///     println!("{}", thing.data.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    client: ReqwestClient,
}

impl Default for Client {
    fn default() -> Self {
        Client::new(PUBLIC_HOST, Config::default())
            .expect("Client with default endpoint should succeed")
    }
}

impl Client {
    /// Creates a new client against a custom host.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid, a header value is not valid ASCII, or the
    /// HTTP client fails to build.
    pub fn new(host: &str, config: Config) -> Result<Client> {
        let mut headers = HeaderMap::new();

        headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = ReqwestClient::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            host: Url::parse(host)?,
            client: builder.build()?,
        })
    }

    /// Creates a client against [`OAUTH_HOST`] when a token is configured, otherwise against
    /// [`PUBLIC_HOST`].
    ///
    /// # Errors
    ///
    /// See [`Client::new`].
    pub fn with_config(config: Config) -> Result<Client> {
        let host = if config.access_token.is_some() {
            OAUTH_HOST
        } else {
            PUBLIC_HOST
        };

        Client::new(host, config)
    }

    /// Returns the host URL for the client.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Fetches one page of the Listing at `path`, e.g. `/r/rust/new` or `/user/spez/comments`.
    ///
    /// `after` is the cursor returned by the previous page; `None` requests the newest page.
    pub async fn listing<T: DeserializeOwned>(
        &self,
        path: &str,
        request: &ListingRequest,
        after: Option<&str>,
    ) -> Result<Listing<T>> {
        let request = self
            .client
            .request(
                Method::GET,
                format!(
                    "{}{}.json{}",
                    self.host(),
                    path.trim_matches('/'),
                    request.query_params(after)
                ),
            )
            .build()?;

        let envelope: ListingEnvelope<T> = crate::request(&self.client, request).await?;
        envelope.try_into()
    }
}
