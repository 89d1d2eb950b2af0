//! Streams new submissions of a subreddit.
//!
//! The first cycle only primes the stream with the current front page, so nothing is printed
//! until a new submission shows up.
//!
//! Run with tracing enabled:
//! ```sh
//! RUST_LOG=info,reddit_client_sdk=debug cargo run --example stream_new --features listing,tracing
//! ```
//!
//! Pick another subreddit, stop after a number of cycles, or log to a file:
//! ```sh
//! SUBREDDIT=programming CYCLES=20 LOG_FILE=stream_new.log RUST_LOG=info cargo run --example stream_new --features listing,tracing
//! ```

use std::fs::File;

use futures::StreamExt as _;
use reddit_client_sdk::client::{Client, Config as ClientConfig};
use reddit_client_sdk::listing::{ListingPaginator, ThingData};
use reddit_client_sdk::stream::{Config, Stream};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Ok(path) = std::env::var("LOG_FILE") {
        let file = File::create(path)?;
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false),
            )
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    let subreddit = std::env::var("SUBREDDIT").unwrap_or_else(|_| "rust".to_owned());
    let cycles = std::env::var("CYCLES")
        .ok()
        .and_then(|cycles| cycles.parse().ok())
        .unwrap_or(usize::MAX);

    let client = Client::with_config(
        ClientConfig::builder()
            .user_agent("rust:reddit-client-sdk-demo:v0.1")
            .build(),
    )?;
    let paginator = ListingPaginator::<ThingData>::new(client, format!("/r/{subreddit}/new"));
    let config = Config::builder()
        .base_interval(std::time::Duration::from_secs(5))
        .build();

    let mut stream = Stream::new(paginator, |thing: &ThingData| thing.name.clone(), config)?;
    stream.output().attach(|thing| {
        let title = thing.extra.get("title").and_then(|title| title.as_str());
        info!(name = %thing.name, title, "new submission");
        Ok(())
    });
    stream.error().attach(|error| {
        warn!(error = %error, "fetch failed, backing off");
        Ok(())
    });

    info!(subreddit = %subreddit, "starting stream");

    let mut pacing = Box::pin(stream.into_pacing().take(cycles));
    while let Some(wait) = pacing.next().await {
        tokio::time::sleep(wait?).await;
    }

    info!(subreddit = %subreddit, "stream completed");
    Ok(())
}
