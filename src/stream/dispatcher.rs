use std::fmt;

use crate::Result;

type Handler<E> = Box<dyn FnMut(&E) -> Result<()> + Send>;

/// Token returned by [`EventDispatcher::attach`], used to detach the handler later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Ordered multicast registry of event handlers.
///
/// Handlers run in registration order. The same closure logic may be attached more than once
/// and will then run once per attachment. Handlers can be attached or detached between
/// dispatches.
pub struct EventDispatcher<E> {
    handlers: Vec<(HandlerId, Handler<E>)>,
    next_id: u64,
}

impl<E> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl<E> EventDispatcher<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` at the end of the invocation order.
    pub fn attach<H>(&mut self, handler: H) -> HandlerId
    where
        H: FnMut(&E) -> Result<()> + Send + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Removes the handler registered under `id`. Returns `false` if it was already gone.
    pub fn detach(&mut self, id: HandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Invokes every handler with `event`, in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first handler error. Handlers registered after the failing one are not
    /// invoked for this event.
    pub fn dispatch(&mut self, event: &E) -> Result<()> {
        for (_, handler) in &mut self.handlers {
            handler(event)?;
        }

        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}
