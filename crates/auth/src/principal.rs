use serde::{Deserialize, Serialize};

use kosmos_core::UserId;

/// Identity attached to every module command: who is calling, and the bearer
/// token they presented.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub calling_user_id: UserId,
    pub token: String,
}

impl Caller {
    pub fn new(calling_user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            calling_user_id,
            token: token.into(),
        }
    }
}

// Tokens stay out of logs.
impl core::fmt::Debug for Caller {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Caller")
            .field("calling_user_id", &self.calling_user_id)
            .field("token", &"<redacted>")
            .finish()
    }
}
