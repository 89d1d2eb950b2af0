//! Interleaves several subreddit streams on a single task.
//!
//! Submissions and comments of every subreddit get their own stream; all of them share one
//! timer heap, so a busy subreddit is polled more often than a quiet one without extra tasks.
//!
//! Run with tracing enabled:
//! ```sh
//! RUST_LOG=info,reddit_client_sdk=debug cargo run --example series --features listing,tracing
//! ```
//!
//! Choose subreddits and stop after some seconds:
//! ```sh
//! SUBREDDITS=rust,programming SECONDS=300 RUST_LOG=info cargo run --example series --features listing,tracing
//! ```

use std::time::Duration;

use reddit_client_sdk::client::Client;
use reddit_client_sdk::listing::{ListingPaginator, ThingData};
use reddit_client_sdk::stream::{Config, Runner, Stream};
use tracing::{error, info};

fn stream(
    client: &Client,
    path: String,
) -> anyhow::Result<Stream<ListingPaginator<ThingData>, fn(&ThingData) -> String, String>> {
    fn fullname(thing: &ThingData) -> String {
        thing.name.clone()
    }

    let paginator = ListingPaginator::new(client.clone(), path.clone());
    let mut stream = Stream::new(paginator, fullname as fn(&ThingData) -> String, Config::default())?;

    stream.output().attach(move |thing| {
        info!(listing = %path, name = %thing.name, "new thing");
        Ok(())
    });

    Ok(stream)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let subreddits = std::env::var("SUBREDDITS").unwrap_or_else(|_| "rust".to_owned());
    let seconds = std::env::var("SECONDS")
        .ok()
        .and_then(|seconds| seconds.parse().ok())
        .unwrap_or(120);

    let client = Client::default();
    let mut runner = Runner::new();
    for subreddit in subreddits.split(',').map(str::trim) {
        runner.push(stream(&client, format!("/r/{subreddit}/new"))?);
        runner.push(stream(&client, format!("/r/{subreddit}/comments"))?);
    }

    let token = runner.token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(seconds)).await;
        token.cancel();
    });

    info!(streams = runner.len(), seconds, "starting series runner");

    for e in runner.run_series().await {
        error!(error = %e, "stream stopped");
    }

    info!("series runner stopped");
    Ok(())
}
