//! Drivers that advance streams and honour the waits they yield.

use std::fmt;

use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::engine::Pollable;
use super::scheduler::Scheduler;
use crate::error::{Error, Kind};

/// Drives a set of streams until they all stop or the runner is cancelled.
///
/// Use [`run_parallel`](Runner::run_parallel) to give every stream its own task, or
/// [`run_series`](Runner::run_series) to interleave them all on the calling task through a
/// [`Scheduler`]. Either way a stream whose handler fails is dropped and its error returned,
/// while the other streams keep running.
///
/// # Example
///
/// ```no_run
/// use reddit_client_sdk::stream::Runner;
/// # use reddit_client_sdk::stream::Pollable;
/// # async fn example(first: impl Pollable + 'static, second: impl Pollable + 'static) {
/// let mut runner = Runner::new();
/// runner.push(first);
/// runner.push(second);
///
/// // Stop both streams after ten minutes
/// let token = runner.token();
/// tokio::spawn(async move {
///     tokio::time::sleep(std::time::Duration::from_secs(600)).await;
///     token.cancel();
/// });
///
/// for error in runner.run_parallel().await {
///     eprintln!("stream stopped: {error}");
/// }
/// # }
/// ```
#[derive(Default)]
pub struct Runner {
    streams: Vec<Box<dyn Pollable>>,
    token: CancellationToken,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("streams", &self.streams.len())
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

impl Runner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner stopped by `token` instead of its own token.
    #[must_use]
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            streams: Vec::new(),
            token,
        }
    }

    pub fn push<S: Pollable + 'static>(&mut self, stream: S) {
        self.streams.push(Box::new(stream));
    }

    /// Token that stops the runner between steps when cancelled.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Runs each stream on its own task, sleeping independently between steps.
    ///
    /// Returns the errors of the streams that stopped on their own once every task has ended.
    pub async fn run_parallel(self) -> Vec<Error> {
        let mut tasks = JoinSet::new();

        for mut stream in self.streams {
            let token = self.token.clone();
            tasks.spawn(async move {
                while !token.is_cancelled() {
                    let wait = stream.step().await?;

                    tokio::select! {
                        biased;
                        () = token.cancelled() => break,
                        () = sleep(wait) => {}
                    }
                }

                Ok::<_, Error>(())
            });
        }

        let mut errors = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let error = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(e) => Error::with_source(Kind::Internal, e),
            };

            #[cfg(feature = "tracing")]
            tracing::error!(error = %error, "stream task stopped");

            errors.push(error);
        }

        #[cfg(feature = "tracing")]
        if self.token.is_cancelled() {
            tracing::debug!("parallel runner stopped by cancellation");
        }

        errors
    }

    /// Interleaves every stream on the calling task.
    ///
    /// All streams are due immediately; after each step a stream is rescheduled after the
    /// wait it yielded. Returns once no stream is left or the runner is cancelled.
    pub async fn run_series(self) -> Vec<Error> {
        let mut streams: Vec<Option<Box<dyn Pollable>>> =
            self.streams.into_iter().map(Some).collect();
        let mut schedule = Scheduler::new();
        for index in 0..streams.len() {
            schedule.schedule_after(std::time::Duration::ZERO, index);
        }

        let mut errors = Vec::new();
        while let Some(index) = schedule.next(&self.token).await {
            let Some(slot) = streams.get_mut(index) else {
                continue;
            };
            let Some(stream) = slot.as_mut() else {
                continue;
            };

            match stream.step().await {
                Ok(wait) => {
                    schedule.schedule_after(wait, index);
                }
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(error = %error, stream = index, "stream removed from schedule");

                    *slot = None;
                    errors.push(error);
                }
            }
        }

        #[cfg(feature = "tracing")]
        if self.token.is_cancelled() {
            tracing::debug!("series runner stopped by cancellation");
        }

        errors
    }
}
