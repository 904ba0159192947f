//! Connection-level wire protocol. Only the first message is parsed here;
//! everything after it is a bridge frame handed to the window's channel.

use serde::{Deserialize, Serialize};
use wicket_common::WindowId;

/// First message a browser sends to claim a window.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientHello {
    Hello { window: WindowId, token: String },
}

/// Messages the server sends outside the bridge frame protocol.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerReply {
    Error { message: String },
}
