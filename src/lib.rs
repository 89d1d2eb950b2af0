#![cfg_attr(doc, doc = include_str!("../README.md"))]

#[cfg(feature = "listing")]
pub mod client;
pub mod error;
#[cfg(feature = "listing")]
pub mod listing;
#[cfg(feature = "listing")]
pub(crate) mod serde_helpers;
pub mod stream;

#[cfg(feature = "listing")]
use reqwest::{Request, StatusCode};
#[cfg(feature = "listing")]
use serde::Serialize;
#[cfg(feature = "listing")]
use serde::de::DeserializeOwned;

use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Trait for converting request types to URL query parameters.
///
/// This trait is automatically implemented for all types that implement [`Serialize`].
/// It uses [`serde_html_form`] to serialize the struct fields into a query string, then
/// appends the listing cursor as `after`, if provided.
#[cfg(feature = "listing")]
pub trait ToQueryParams: Serialize {
    /// Returns an empty string if no parameters are set, otherwise a string starting with `?`
    /// followed by URL-encoded key-value pairs.
    fn query_params(&self, after: Option<&str>) -> String {
        let params = serde_html_form::to_string(self)
            .and_then(|mut params| {
                if let Some(cursor) = after {
                    if !params.is_empty() {
                        params.push('&');
                    }
                    params.push_str(&serde_html_form::to_string(&[("after", cursor)])?);
                }
                Ok(params)
            })
            .inspect_err(|e| {
                #[cfg(feature = "tracing")]
                tracing::error!("Unable to convert to URL-encoded string {e:?}");
                #[cfg(not(feature = "tracing"))]
                let _: &serde_html_form::ser::Error = e;
            })
            .unwrap_or_default();

        if params.is_empty() {
            String::new()
        } else {
            format!("?{params}")
        }
    }
}

#[cfg(feature = "listing")]
impl<T: Serialize> ToQueryParams for T {}

#[cfg(feature = "listing")]
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request<Response: DeserializeOwned>(
    client: &reqwest::Client,
    request: Request,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let json_value = response.json::<serde_json::Value>().await?;
    let response_data: Option<Response> = serde_helpers::deserialize_with_warnings(json_value)?;

    if let Some(response) = response_data {
        Ok(response)
    } else {
        #[cfg(feature = "tracing")]
        tracing::warn!(method = %method, path = %path, "API resource not found");
        Err(Error::status(
            StatusCode::NOT_FOUND,
            method,
            path,
            "Unable to find requested resource",
        ))
    }
}
