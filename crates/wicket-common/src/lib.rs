pub mod errors;
pub mod id;

pub use errors::{BridgeError, ChannelError, ConfigError, ScriptError};
pub use id::{new_channel_token, BindId, WindowId};

pub type Result<T> = std::result::Result<T, BridgeError>;
