//! # Session State
//!
//! Thread-safe handle around one in-progress order session.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` because:
//! 1. UI commands may run concurrently on the async runtime
//! 2. Only one command should mutate the session at a time
//! 3. The lock is held only across synchronous mutation, never across an
//!    await - collaborator fetches complete first, then the result is
//!    applied under the lock
//!
//! ## Why Not RwLock?
//! Session operations are quick and most of them mutate state. A RwLock
//! would add complexity with minimal benefit.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use meridian_core::OrderSession;

/// Shared ownership of one [`OrderSession`].
#[derive(Debug, Clone)]
pub struct SessionState {
    session: Arc<Mutex<OrderSession>>,
}

impl SessionState {
    /// Creates a fresh, empty session state.
    pub fn new() -> Self {
        SessionState {
            session: Arc::new(Mutex::new(OrderSession::new(Utc::now()))),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.with_session(|s| s.totals());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&OrderSession) -> R,
    {
        let session = self.session.lock().expect("order session mutex poisoned");
        f(&session)
    }

    /// Executes a function with write access to the session.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_session_mut(|s| s.set_tax_exempt(true));
    /// ```
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut OrderSession) -> R,
    {
        let mut session = self.session.lock().expect("order session mutex poisoned");
        f(&mut session)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
