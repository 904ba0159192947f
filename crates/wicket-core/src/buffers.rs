//! Managed byte buffers, released in bulk by `Bridge::cleanup`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::sync::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

#[derive(Debug, Default)]
pub struct Buffers {
    next: AtomicU64,
    buffers: Mutex<HashMap<u64, Vec<u8>>>,
}

impl Buffers {
    /// Allocate a zeroed buffer of `size` bytes.
    pub fn alloc(&self, size: usize) -> BufferId {
        let id = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        lock(&self.buffers).insert(id, vec![0; size]);
        BufferId(id)
    }

    /// Run `f` against the buffer. `None` if it was freed.
    pub fn with_buffer<R>(&self, id: BufferId, f: impl FnOnce(&mut Vec<u8>) -> R) -> Option<R> {
        lock(&self.buffers).get_mut(&id.0).map(f)
    }

    /// Remove the buffer and hand its bytes to the caller.
    pub fn take(&self, id: BufferId) -> Option<Vec<u8>> {
        lock(&self.buffers).remove(&id.0)
    }

    pub fn free(&self, id: BufferId) -> bool {
        self.take(id).is_some()
    }

    pub fn clear(&self) -> usize {
        let mut buffers = lock(&self.buffers);
        let count = buffers.len();
        buffers.clear();
        count
    }

    pub fn len(&self) -> usize {
        lock(&self.buffers).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
