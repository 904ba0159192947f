//! Network front end for the bridge.
//!
//! [`ChannelServer`] accepts browser WebSockets and attaches each one to a
//! window after a hello handshake. [`AssetServer`] serves window pages and
//! the client script over HTTP. Both terminate TLS when the bridge carries
//! certificate material.

pub mod connection;
pub mod protocol;
pub mod server;
pub mod tls;

pub use server::{router, AssetServer, ChannelServer};
