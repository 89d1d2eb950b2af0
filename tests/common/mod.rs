#![allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    reason = "Do not need additional syntax for setting up tests"
)]
#![allow(
    unused,
    reason = "Each test crate only uses part of the shared helpers"
)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reddit_client_sdk::Result;
use reddit_client_sdk::error::{Error, Method, StatusCode};
use reddit_client_sdk::stream::{Config, CursorPaginator, Resettable, Stream};

/// One scripted response of a [`ScriptedPaginator`].
#[derive(Debug, Clone)]
pub enum Step {
    Page {
        items: Vec<u32>,
        cursor: Option<&'static str>,
    },
    Fail,
}

#[must_use]
pub fn page(items: &[u32]) -> Step {
    Step::Page {
        items: items.to_vec(),
        cursor: None,
    }
}

#[must_use]
pub fn page_with_cursor(items: &[u32], cursor: &'static str) -> Step {
    Step::Page {
        items: items.to_vec(),
        cursor: Some(cursor),
    }
}

/// Paginator that replays a fixed script regardless of cursor or limit. Once the script runs
/// out every fetch returns an empty page.
#[derive(Debug, Default)]
pub struct ScriptedPaginator {
    script: VecDeque<Step>,
    cursor: Option<String>,
    limit: usize,
    pub limits: Vec<usize>,
    pub resets: usize,
    pub fetches: Arc<AtomicUsize>,
}

impl ScriptedPaginator {
    #[must_use]
    pub fn new<I: IntoIterator<Item = Step>>(script: I) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cursor(mut self, cursor: &str) -> Self {
        self.cursor = Some(cursor.to_owned());
        self
    }

    #[must_use]
    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.fetches)
    }
}

#[async_trait]
impl CursorPaginator for ScriptedPaginator {
    type Item = u32;

    async fn fetch(&mut self) -> Result<Vec<u32>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.limits.push(self.limit);

        match self.script.pop_front() {
            Some(Step::Page { items, cursor }) => {
                self.cursor = cursor.map(str::to_owned);
                Ok(items)
            }
            Some(Step::Fail) => Err(Error::status(
                StatusCode::SERVICE_UNAVAILABLE,
                Method::GET,
                "/r/test/new.json".to_owned(),
                "scripted failure",
            )),
            None => {
                self.cursor = None;
                Ok(Vec::new())
            }
        }
    }

    fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
    }

    fn limit(&self) -> usize {
        self.limit
    }
}

impl Resettable for ScriptedPaginator {
    fn reset(&mut self) {
        self.resets += 1;
        self.cursor = None;
    }
}

pub type Identity = fn(&u32) -> u32;

pub type TestStream = Stream<ScriptedPaginator, Identity, u32>;

fn identity(item: &u32) -> u32 {
    *item
}

/// Deterministic configuration: no jitter, one second base delay, eight second ceiling.
#[must_use]
pub fn config() -> Config {
    Config::builder()
        .jitter_factor(0.0)
        .base_interval(Duration::from_secs(1))
        .max_interval(Duration::from_secs(8))
        .build()
}

#[must_use]
pub fn stream(paginator: ScriptedPaginator, config: Config) -> TestStream {
    Stream::new(paginator, identity as Identity, config).unwrap()
}

/// Attaches an output handler recording every emitted item.
pub fn record_output(stream: &mut TestStream) -> Arc<Mutex<Vec<u32>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    stream.output().attach(move |item| {
        sink.lock().unwrap().push(*item);
        Ok(())
    });
    log
}

/// Attaches an error handler recording the display form of every fetch error.
pub fn record_errors(stream: &mut TestStream) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    stream.error().attach(move |error| {
        sink.lock().unwrap().push(error.to_string());
        Ok(())
    });
    log
}

#[must_use]
pub fn snapshot<T: Clone>(log: &Arc<Mutex<Vec<T>>>) -> Vec<T> {
    log.lock().unwrap().clone()
}
