use std::time::Duration;

use tracing::{debug, trace};
use wicket_common::{Result, ScriptError, WindowId};

use crate::protocol::OutboundFrame;

use super::Bridge;

const SCRIPT_ERROR: &str = "wicket: script error";
const TIMEOUT: &str = "wicket: timeout";
const DISCONNECTED: &str = "wicket: disconnected";

impl Bridge {
    /// Run `js` in the window without waiting for a result.
    pub fn run(&self, id: WindowId, js: &str) -> Result<()> {
        self.ensure_running()?;
        self.window(id)?.send(&OutboundFrame::Script {
            call_number: 0,
            script: js.to_string(),
        })
    }

    /// Run `js` in the window and block for its result. A zero `timeout`
    /// waits until the window answers or disconnects.
    pub fn script(
        &self,
        id: WindowId,
        js: &str,
        timeout: Duration,
    ) -> std::result::Result<String, ScriptError> {
        if self.ensure_running().is_err() {
            return Err(ScriptError::Disconnected);
        }
        let window = self.window(id).map_err(|_| ScriptError::InvalidWindow(id))?;
        let call = window.send_script(js).map_err(|e| {
            debug!(window = %id, error = %e, "script send failed");
            ScriptError::Disconnected
        })?;
        trace!(window = %id, call_number = call.call_number, "script sent");
        window.pending.wait(call, timeout)
    }

    /// [`script`](Self::script) writing into a caller buffer. A browser-side
    /// error leaves its message in the buffer; other failures write an
    /// indicator text. Output is
    /// truncated to the buffer and the unused tail is zeroed.
    pub fn script_into(
        &self,
        id: WindowId,
        js: &str,
        timeout: Duration,
        buffer: &mut [u8],
    ) -> bool {
        let (ok, text) = match self.script(id, js, timeout) {
            Ok(data) => (true, data),
            Err(ScriptError::Failed(message)) if !message.is_empty() => (false, message),
            Err(ScriptError::Failed(_)) => (false, SCRIPT_ERROR.to_string()),
            Err(ScriptError::Timeout) => (false, TIMEOUT.to_string()),
            Err(ScriptError::Disconnected | ScriptError::InvalidWindow(_)) => {
                (false, DISCONNECTED.to_string())
            }
        };
        let bytes = text.as_bytes();
        let n = bytes.len().min(buffer.len());
        buffer[..n].copy_from_slice(&bytes[..n]);
        buffer[n..].fill(0);
        ok
    }

    /// Hand `data` to the browser-side function named `function`.
    pub fn send_raw(&self, id: WindowId, function: &str, data: &[u8]) -> Result<()> {
        self.ensure_running()?;
        self.window(id)?.send(&OutboundFrame::Raw {
            function: function.to_string(),
            data: data.to_vec(),
        })
    }
}
