//! Frame protocol between the native process and the browser.
//!
//! Frames flow in both directions over a window's channel as JSON text:
//! - **Browser -> native**: [`InboundFrame`], tagged by `"type"`. Connection
//!   state changes, element events, callback calls and script responses.
//! - **Native -> browser**: [`OutboundFrame`]. Script requests, callback
//!   responses, raw byte pushes and navigation.

use serde::{Deserialize, Serialize};

use crate::codec::{base64_bytes, Argument};

/// A frame received from the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundFrame {
    Connected,
    Disconnected,
    Click {
        event_number: usize,
        element: String,
        #[serde(default)]
        args: Vec<Argument>,
    },
    Navigation {
        url: String,
    },
    Call {
        event_number: usize,
        element: String,
        #[serde(default)]
        args: Vec<Argument>,
    },
    ScriptResponse {
        call_number: usize,
        #[serde(default)]
        error: bool,
        #[serde(default)]
        data: String,
    },
    Ping,
    #[serde(other)]
    Unknown,
}

impl InboundFrame {
    /// Parse a frame from raw JSON text sent by the browser.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Short name of the frame kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Click { .. } => "click",
            Self::Navigation { .. } => "navigation",
            Self::Call { .. } => "call",
            Self::ScriptResponse { .. } => "script_response",
            Self::Ping => "ping",
            Self::Unknown => "unknown",
        }
    }
}

/// A frame sent to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    /// Evaluate `script`. A `call_number` of 0 expects no response.
    Script { call_number: usize, script: String },
    CallResponse { event_number: usize, value: Argument },
    /// Hand a byte buffer to the named browser-side function.
    Raw {
        function: String,
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
    Navigate { url: String },
    Close,
    Pong,
}

impl OutboundFrame {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"pong"}"#.to_string())
    }
}

/// Browser-side client. Served as `wicket.js`, after a prelude that sets
/// `window.__wicket_config = {endpoint, window, token}`. Without an
/// endpoint the client connects back to the origin that served it.
pub const CLIENT_SCRIPT: &str = r#"
(function() {
    var cfg = window.__wicket_config || {};
    var pending = {};
    var nextEvent = 1;
    var socket = null;

    function send(frame) {
        if (socket && socket.readyState === 1) {
            socket.send(JSON.stringify(frame));
        }
    }

    function toArg(v) {
        if (typeof v === 'number') return { type: 'int', value: Math.trunc(v) };
        if (typeof v === 'boolean') return { type: 'bool', value: v };
        if (v instanceof Uint8Array) {
            var s = '';
            for (var i = 0; i < v.length; i++) s += String.fromCharCode(v[i]);
            return { type: 'raw', value: btoa(s) };
        }
        return { type: 'text', value: v == null ? '' : String(v) };
    }

    function fromArg(a) {
        if (!a) return '';
        if (a.type === 'raw') {
            var bin = atob(a.value);
            var out = new Uint8Array(bin.length);
            for (var i = 0; i < bin.length; i++) out[i] = bin.charCodeAt(i);
            return out;
        }
        return a.value;
    }

    function evaluate(frame) {
        var ok = true, data = '';
        try {
            var result = (0, eval)('(function(){' + frame.script + '\n})()');
            data = result == null ? '' : String(result);
        } catch (e) {
            ok = false;
            data = String(e);
        }
        if (frame.call_number !== 0) {
            send({ type: 'script_response', call_number: frame.call_number, error: !ok, data: data });
        }
    }

    function onFrame(frame) {
        switch (frame.type) {
            case 'script': evaluate(frame); break;
            case 'call_response':
                var resolve = pending[frame.event_number];
                if (resolve) {
                    delete pending[frame.event_number];
                    resolve(fromArg(frame.value));
                }
                break;
            case 'raw':
                var fn = window[frame.function];
                if (typeof fn === 'function') fn(fromArg({ type: 'raw', value: frame.data }));
                break;
            case 'navigate': window.location.href = frame.url; break;
            case 'close': if (socket) socket.close(); window.close(); break;
            case 'pong': break;
        }
    }

    window.wicket = {
        call: function(element) {
            var args = Array.prototype.slice.call(arguments, 1).map(toArg);
            var n = nextEvent++;
            return new Promise(function(resolve) {
                pending[n] = resolve;
                send({ type: 'call', event_number: n, element: element, args: args });
            });
        },
        isConnected: function() { return !!socket && socket.readyState === 1; }
    };

    document.addEventListener('click', function(e) {
        var el = e.target;
        while (el && !el.id) el = el.parentElement;
        if (!el) return;
        send({ type: 'click', event_number: nextEvent++, element: el.id, args: [] });
    });

    window.addEventListener('beforeunload', function() {
        send({ type: 'navigation', url: window.location.href });
    });

    var endpoint = cfg.endpoint ||
        ((location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/');
    if (location.protocol !== 'file:') {
        socket = new WebSocket(endpoint);
        socket.onopen = function() {
            socket.send(JSON.stringify({ type: 'hello', window: cfg.window, token: cfg.token }));
        };
        socket.onmessage = function(msg) {
            try { onFrame(JSON.parse(msg.data)); } catch (e) { console.error('wicket:', e); }
        };
    }
})();
"#;
