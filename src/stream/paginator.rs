//! Contracts a [`Stream`](super::Stream) needs from the pagination layer.

use async_trait::async_trait;

use crate::Result;

/// A cursor-driven source of pages.
///
/// Implementations perform the actual I/O. Any error returned from [`fetch`](Self::fetch) is
/// treated by the stream as transient: it is reported and retried, never propagated.
#[async_trait]
pub trait CursorPaginator: Send {
    type Item: Send;

    /// Fetches the next page and advances the cursor past it.
    async fn fetch(&mut self) -> Result<Vec<Self::Item>>;

    /// The current forward position, or `None` when at the live edge.
    fn cursor(&self) -> Option<&str>;

    fn has_cursor(&self) -> bool {
        self.cursor().is_some()
    }

    /// Page size used by the next [`fetch`](Self::fetch). Implementations may clamp `limit`
    /// to whatever the upstream API accepts.
    fn set_limit(&mut self, limit: usize);

    fn limit(&self) -> usize;
}

/// Capability to rewind a paginator back to the live edge.
///
/// A [`Stream`](super::Stream) only accepts paginators implementing this trait.
pub trait Resettable {
    /// Clears cursor state so the next fetch re-reads the newest page. Must not fail.
    fn reset(&mut self);
}
