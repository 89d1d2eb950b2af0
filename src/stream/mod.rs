//! Live polling of paginated listings.
//!
//! A [`Stream`] repeatedly fetches the newest page of a [`CursorPaginator`], remembers which
//! items it has already emitted in a [`BoundedSet`], and hands only new items to the handlers
//! attached to its [`output`](Stream::output) dispatcher. Every step returns the time to wait
//! before the next one; the stream itself never sleeps.
//!
//! # Architecture
//!
//! - [`Stream`]: adaptive page size, backoff with jitter, and periodic cursor rewinds
//! - [`EventDispatcher`]: ordered multicast handlers for emitted items and fetch errors
//! - [`BoundedSet`]: FIFO-bounded memory of emitted item identities
//! - [`Runner`]: drives many streams, either one task each or interleaved on one task
//! - [`Scheduler`]: timer heap behind the interleaved runner
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "listing")]
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use reddit_client_sdk::client::Client;
//! use reddit_client_sdk::listing::{ThingData, ListingPaginator};
//! use reddit_client_sdk::stream::{Config, Runner, Stream};
//!
//! let client = Client::default();
//! let paginator = ListingPaginator::<ThingData>::new(client, "/r/rust/new");
//! let mut stream = Stream::new(paginator, |thing: &ThingData| thing.name.clone(), Config::default())?;
//!
//! stream.output().attach(|thing| {
//!     println!("new submission {}", thing.name);
//!     Ok(())
//! });
//!
//! let mut runner = Runner::new();
//! runner.push(stream);
//! runner.run_parallel().await;
//! # Ok(())
//! # }
//! ```

pub mod bounded_set;
pub mod config;
pub mod dispatcher;
mod engine;
pub mod paginator;
pub mod runner;
pub mod scheduler;

pub use bounded_set::BoundedSet;
pub use config::Config;
pub use dispatcher::{EventDispatcher, HandlerId};
pub use engine::{Pollable, Stream};
pub use paginator::{CursorPaginator, Resettable};
pub use runner::Runner;
pub use scheduler::{Scheduler, TimerId};
