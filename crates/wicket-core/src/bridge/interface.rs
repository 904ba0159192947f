use std::sync::Arc;

use tracing::debug;
use wicket_common::{BindId, BridgeError, Result, WindowId};

use crate::binding::{Binding, Handler, RawHandler};
use crate::codec::Arguments;
use crate::events::RawEvent;

use super::Bridge;

impl Bridge {
    /// Bind `handler` to `element` in the window. `""` binds the wildcard,
    /// which also receives connect and disconnect events. Rebinding an
    /// element replaces its handler under a fresh id.
    pub fn bind<H>(&self, id: WindowId, element: &str, handler: H) -> Result<BindId>
    where
        H: Handler + 'static,
    {
        self.bind_handler(id, element, Arc::new(handler))
    }

    /// Bind a handler that receives primitive event values.
    pub fn bind_raw<F>(&self, id: WindowId, element: &str, f: F) -> Result<BindId>
    where
        F: Fn(RawEvent) + Send + Sync + 'static,
    {
        self.bind_handler(id, element, Arc::new(RawHandler(f)))
    }

    fn bind_handler(&self, id: WindowId, element: &str, handler: Arc<dyn Handler>) -> Result<BindId> {
        self.ensure_running()?;
        let window = self.window(id)?;
        let bind_id = self
            .shared
            .bind_ids
            .allocate()
            .ok_or(BridgeError::ResourceExhausted("bind ids"))?;
        let replaced = window.bind(element, Binding { bind_id, handler });
        debug!(
            window = %id,
            element,
            bind_id = %bind_id,
            replaced = replaced.is_some(),
            "element bound"
        );
        Ok(bind_id)
    }

    /// Remove the binding of `element`. Returns whether one existed.
    pub fn unbind(&self, id: WindowId, element: &str) -> Result<bool> {
        self.ensure_running()?;
        Ok(self.window(id)?.unbind(element).is_some())
    }

    // =========================================================================
    // Raw interface over outstanding events
    // =========================================================================

    fn event_args(&self, id: WindowId, event_number: usize) -> Arguments {
        self.window(id)
            .ok()
            .and_then(|w| w.event_args(event_number))
            .unwrap_or_default()
    }

    pub fn interface_get_string_at(&self, id: WindowId, event_number: usize, index: usize) -> String {
        self.event_args(id, event_number).string_at(index)
    }

    pub fn interface_get_int_at(&self, id: WindowId, event_number: usize, index: usize) -> i64 {
        self.event_args(id, event_number).int_at(index)
    }

    pub fn interface_get_bool_at(&self, id: WindowId, event_number: usize, index: usize) -> bool {
        self.event_args(id, event_number).bool_at(index)
    }

    pub fn interface_get_size_at(&self, id: WindowId, event_number: usize, index: usize) -> usize {
        self.event_args(id, event_number).size_at(index)
    }

    /// Set the text response of an outstanding event. Ignored if the event
    /// is not outstanding. A structured `return_*` on the event wins.
    pub fn set_response(&self, id: WindowId, event_number: usize, response: &str) -> bool {
        self.window(id)
            .map(|w| w.set_event_response(event_number, response.to_string()))
            .unwrap_or(false)
    }
}
