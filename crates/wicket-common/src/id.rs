use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a window. `0` is never a valid window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub usize);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a registered element/callback association. `0` is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BindId(pub usize);

impl BindId {
    pub const INVALID: BindId = BindId(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for BindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generate a fresh channel token. A browser connecting to a window must
/// present the token handed out by the most recent `show`.
pub fn new_channel_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
