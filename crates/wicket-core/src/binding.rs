//! Element bindings: which native callback runs for which browser element.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use wicket_common::BindId;

use crate::events::{Event, RawEvent};

/// Element key that catches every event without a specific binding.
pub const WILDCARD: &str = "";

/// A native callback bound to an element.
pub trait Handler: Send + Sync {
    fn invoke(&self, event: &mut Event);
}

impl<F> Handler for F
where
    F: Fn(&mut Event) + Send + Sync,
{
    fn invoke(&self, event: &mut Event) {
        self(event)
    }
}

/// Adapts a callback taking primitive values to [`Handler`].
pub(crate) struct RawHandler<F>(pub F);

impl<F> Handler for RawHandler<F>
where
    F: Fn(RawEvent) + Send + Sync,
{
    fn invoke(&self, event: &mut Event) {
        (self.0)(RawEvent::from(&*event))
    }
}

#[derive(Clone)]
pub(crate) struct Binding {
    pub bind_id: BindId,
    pub handler: Arc<dyn Handler>,
}

/// Per-window map from element id to binding.
#[derive(Default)]
pub(crate) struct BindingTable {
    entries: HashMap<String, Binding>,
}

impl BindingTable {
    /// Insert or replace the binding for `element`. Returns the replaced one.
    pub fn insert(&mut self, element: &str, binding: Binding) -> Option<Binding> {
        self.entries.insert(element.to_string(), binding)
    }

    pub fn remove(&mut self, element: &str) -> Option<Binding> {
        self.entries.remove(element)
    }

    /// Exact element match first, then the wildcard.
    pub fn resolve(&self, element: &str) -> Option<Binding> {
        self.entries
            .get(element)
            .or_else(|| self.entries.get(WILDCARD))
            .cloned()
    }

    pub fn wildcard(&self) -> Option<Binding> {
        self.entries.get(WILDCARD).cloned()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Process-wide bind id source: monotonic from 1, never reused.
pub(crate) struct BindIdAllocator {
    next: AtomicUsize,
}

impl BindIdAllocator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: usize) -> Self {
        Self {
            next: AtomicUsize::new(first),
        }
    }

    /// Next id, or `None` once the id space is exhausted.
    pub fn allocate(&self) -> Option<BindId> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .ok()
            .map(BindId)
    }
}
