//! Per-request access context.
//!
//! The caller authenticates and authorizes outside this crate, then hands
//! the result in explicitly. Core operations take `&AccessContext` and record
//! the caller on their tracing spans; nothing here is global or cached.

use std::fmt;

/// Identity of an already-authorized caller for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessContext {
    user: String,
}

impl AccessContext {
    /// Build a context for a caller the front end has already authorized.
    #[must_use]
    pub fn authorized(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }

    /// The authorized user name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }
}

impl fmt::Display for AccessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user)
    }
}
