use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use backoff::backoff::Backoff as _;

use super::bounded_set::BoundedSet;
use super::config::Config;
use super::dispatcher::EventDispatcher;
use super::paginator::{CursorPaginator, Resettable};
use crate::Result;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Priming the de-dup memory from the live edge
    Initial,
    Steady,
}

/// Adaptive polling loop over a [`CursorPaginator`].
///
/// Each call to [`advance`](Stream::advance) performs exactly one fetch, emits every item not
/// seen before through [`output`](Stream::output), and returns how long the driver should wait
/// before calling it again. Fetch failures are reported through [`error`](Stream::error) and
/// retried with exponential backoff; they never surface from `advance`.
///
/// A handler error aborts the current step. Items of the page that were not handed to the
/// output handlers yet stay unseen and the paginator is rewound, so a later step delivers them.
///
/// The first step primes the de-dup memory with the newest page instead of emitting it, unless
/// the stream was seeded with [`with_past`](Stream::with_past) or
/// [`with_seen`](Stream::with_seen), or the paginator already carries a cursor.
///
/// Between steps the page size adapts to the observed rate of new items: it halves when
/// nothing new shows up, doubles when a page is entirely new, and otherwise converges on
/// [`Config::target_limit_multiplier`] times the number of new items. The paginator is
/// rewound to the live edge whenever a page comes back short or more than
/// [`Config::backtrack_depth_threshold`] items were emitted since the last rewind.
///
/// # Example
///
/// ```no_run
/// use reddit_client_sdk::stream::{Config, Stream};
/// # use reddit_client_sdk::stream::{CursorPaginator, Resettable};
/// # async fn example<P>(paginator: P) -> reddit_client_sdk::Result<()>
/// # where
/// #     P: CursorPaginator<Item = String> + Resettable,
/// # {
/// let mut stream = Stream::new(paginator, |item: &String| item.clone(), Config::default())?;
///
/// stream.output().attach(|item| {
///     println!("new item: {item}");
///     Ok(())
/// });
///
/// loop {
///     let wait = stream.advance().await?;
///     tokio::time::sleep(wait).await;
/// }
/// # }
/// ```
pub struct Stream<P, F, K>
where
    P: CursorPaginator + Resettable,
{
    paginator: P,
    extractor: F,
    config: Config,
    output: EventDispatcher<P::Item>,
    error: EventDispatcher<Error>,
    seen: BoundedSet<K>,
    current_limit: f64,
    delay: Duration,
    // Always one growth step ahead of `delay`
    backoff: ExponentialBackoff,
    backtrack_count: usize,
    phase: Phase,
}

impl<P, F, K> fmt::Debug for Stream<P, F, K>
where
    P: CursorPaginator + Resettable,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("current_limit", &self.current_limit)
            .field("delay", &self.delay)
            .field("backtrack_count", &self.backtrack_count)
            .field("seen", &self.seen.len())
            .finish_non_exhaustive()
    }
}

impl<P, F, K> Stream<P, F, K>
where
    P: CursorPaginator + Resettable,
    F: Fn(&P::Item) -> K + Send,
    K: Hash + Eq + Clone + Send,
{
    /// Creates a stream that owns `paginator` and identifies items with `extractor`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `config` is unusable. No I/O happens here.
    pub fn new(paginator: P, extractor: F, config: Config) -> Result<Self> {
        config.validate()?;

        #[expect(
            clippy::cast_precision_loss,
            reason = "Page sizes are far below the range where f64 loses integer precision"
        )]
        let current_limit = config.max_limit as f64;

        let mut stream = Self {
            paginator,
            extractor,
            seen: BoundedSet::new(config.memory_capacity),
            current_limit,
            delay: config.base_interval,
            backoff: (&config).into(),
            backtrack_count: 0,
            phase: Phase::Initial,
            output: EventDispatcher::new(),
            error: EventDispatcher::new(),
            config,
        };
        stream.reset_backoff();

        Ok(stream)
    }

    /// Seeds the de-dup memory with already known items so they are never emitted.
    ///
    /// A seeded stream skips the priming fetch: its first step is a regular polling cycle.
    #[must_use]
    pub fn with_past<I: IntoIterator<Item = P::Item>>(mut self, past: I) -> Self {
        for item in past {
            self.seen.insert((self.extractor)(&item));
        }
        self.phase = Phase::Steady;
        self
    }

    /// Like [`with_past`](Self::with_past), but seeds identities directly.
    #[must_use]
    pub fn with_seen<I: IntoIterator<Item = K>>(mut self, seen: I) -> Self {
        self.seen.extend(seen);
        self.phase = Phase::Steady;
        self
    }

    /// Handlers invoked once per newly discovered item, in page order.
    pub fn output(&mut self) -> &mut EventDispatcher<P::Item> {
        &mut self.output
    }

    /// Handlers invoked once per failed fetch.
    pub fn error(&mut self) -> &mut EventDispatcher<Error> {
        &mut self.error
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn paginator(&self) -> &P {
        &self.paginator
    }

    #[must_use]
    pub fn into_paginator(self) -> P {
        self.paginator
    }

    #[must_use]
    pub fn seen(&self) -> &BoundedSet<K> {
        &self.seen
    }

    /// The adaptively tuned page size, before rounding.
    #[must_use]
    pub fn current_limit(&self) -> f64 {
        self.current_limit
    }

    /// The page size requested by the next steady-state fetch.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "current_limit is kept within [1, max_limit]"
        )]
        let limit = self.current_limit.round() as usize;

        limit.clamp(1, self.config.max_limit)
    }

    /// The un-jittered backoff delay.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Items emitted since the paginator was last rewound.
    #[must_use]
    pub fn backtrack_count(&self) -> usize {
        self.backtrack_count
    }

    /// Runs one step of the loop and returns how long to wait before the next one.
    ///
    /// # Errors
    ///
    /// Only handler errors are returned. Fetch errors are dispatched to
    /// [`error`](Self::error) handlers instead.
    pub async fn advance(&mut self) -> Result<Duration> {
        match self.phase {
            Phase::Initial if !self.paginator.has_cursor() => self.prime().await,
            Phase::Initial => {
                self.phase = Phase::Steady;
                self.poll().await
            }
            Phase::Steady => self.poll().await,
        }
    }

    /// Consumes the stream into the sequence of waits produced by [`advance`](Self::advance).
    ///
    /// The sequence never ends on its own; it stops after yielding the first handler error.
    pub fn into_pacing(mut self) -> impl futures::Stream<Item = Result<Duration>> {
        try_stream! {
            loop {
                let wait = self.advance().await?;
                yield wait;
            }
        }
    }

    async fn prime(&mut self) -> Result<Duration> {
        self.paginator.set_limit(self.config.max_limit);

        let items = match self.paginator.fetch().await {
            Ok(items) => items,
            Err(e) => return self.fetch_failed(e),
        };

        self.reset_backoff();
        self.paginator.reset();
        for item in &items {
            self.seen.insert((self.extractor)(item));
        }
        self.phase = Phase::Steady;

        #[cfg(feature = "tracing")]
        tracing::debug!(primed = items.len(), "stream memory primed from live edge");

        Ok(Duration::ZERO)
    }

    async fn poll(&mut self) -> Result<Duration> {
        let effective_limit = self.effective_limit();
        self.paginator.set_limit(effective_limit);

        let items = match self.paginator.fetch().await {
            Ok(items) => items,
            Err(e) => {
                self.rewind();
                return self.fetch_failed(e);
            }
        };

        let mut selected = 0;
        for item in items {
            if !self.seen.insert((self.extractor)(&item)) {
                continue;
            }
            selected += 1;

            if let Err(e) = self.output.dispatch(&item) {
                // The rest of the page is still unseen; re-read it from the live edge
                self.rewind();
                return Err(e);
            }
        }

        self.backtrack_count += selected;
        if selected < effective_limit
            || self.backtrack_count > self.config.backtrack_depth_threshold
        {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                selected,
                effective_limit,
                backtrack_count = self.backtrack_count,
                "rewinding paginator to live edge"
            );

            self.rewind();
        }

        self.tune_limit(selected, effective_limit);
        let caught_up = self.reset_backoff();

        let wait = if self.paginator.has_cursor() {
            self.config.drain_interval
        } else {
            caught_up
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(
            selected,
            effective_limit,
            next_limit = self.current_limit,
            ?wait,
            "stream cycle complete"
        );

        Ok(wait)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "The page size is tuned as a continuous value and rounded on use"
    )]
    fn tune_limit(&mut self, selected: usize, effective_limit: usize) {
        #[expect(
            clippy::cast_precision_loss,
            reason = "Page sizes are far below the range where f64 loses integer precision"
        )]
        let (selected_f, max_limit) = (selected as f64, self.config.max_limit as f64);

        self.current_limit = if selected == 0 {
            self.current_limit / 2.0
        } else if selected >= effective_limit {
            self.current_limit * 2.0
        } else {
            self.config.target_limit_multiplier * selected_f
        }
        .clamp(1.0, max_limit);
    }

    fn rewind(&mut self) {
        self.paginator.reset();
        self.backtrack_count = 0;
    }

    /// Grows the delay and reports `error`. Returns a jittered sample of the grown delay.
    fn fetch_failed(&mut self, error: Error) -> Result<Duration> {
        self.delay = self.backoff.current_interval;
        let wait = self.backoff.next_backoff().unwrap_or(self.delay);

        #[cfg(feature = "tracing")]
        tracing::warn!(error = %error, delay = ?self.delay, "stream fetch failed");

        self.error.dispatch(&error)?;
        Ok(wait)
    }

    /// Drops the delay back to the base interval. Returns a jittered sample of it.
    fn reset_backoff(&mut self) -> Duration {
        self.backoff.reset();
        self.delay = self.backoff.current_interval;
        self.backoff.next_backoff().unwrap_or(self.delay)
    }
}

/// Object-safe view of a [`Stream`] used by the runners to drive heterogeneous streams.
#[async_trait]
pub trait Pollable: Send {
    /// Equivalent to [`Stream::advance`].
    async fn step(&mut self) -> Result<Duration>;
}

#[async_trait]
impl<P, F, K> Pollable for Stream<P, F, K>
where
    P: CursorPaginator + Resettable,
    F: Fn(&P::Item) -> K + Send,
    K: Hash + Eq + Clone + Send,
{
    async fn step(&mut self) -> Result<Duration> {
        self.advance().await
    }
}
