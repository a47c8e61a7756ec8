//! Session identity: one token per arena run.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for minting tokens. Process-wide so tokens from different
/// arenas never collide either.
static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Identifies one start-to-stop run of an arena.
///
/// Tokens are strictly ordered by creation and only compare equal to
/// themselves: two `start()` calls never produce equal tokens, even on the
/// same arena within the same tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionToken(NonZeroU64);

impl SessionToken {
    fn mint() -> Self {
        let raw = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 sessions to wrap.
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// The raw sequence number, for logging.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// A snapshot of a [`SessionClock`]: the current token and whether the
/// arena is running.
///
/// Cheap to copy. Scheduled-task wrappers compare a fresh snapshot against
/// what they captured at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    /// `None` until the arena has started at least once.
    pub token: Option<SessionToken>,
    pub running: bool,
}

impl SessionState {
    /// Returns `true` if this snapshot describes a running session that
    /// was minted as `token`.
    pub fn is_current(&self, token: SessionToken) -> bool {
        self.running && self.token == Some(token)
    }
}

/// Anything that can report the live session state of one arena.
///
/// The scheduler asks for a fresh snapshot before every repeating-task
/// invocation, so state changes made by earlier tasks in the same tick are
/// observed by later ones.
pub trait SessionSource {
    fn session(&self) -> SessionState;
}

/// Owns the session token and running flag of one arena.
///
/// Only the arena's start/stop transition mutates it. Tasks discover the
/// change lazily on their next tick; stopping the clock cancels nothing by
/// itself.
#[derive(Debug, Default)]
pub struct SessionClock {
    state: SessionState,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a new session and returns its token.
    ///
    /// Any token handed out earlier is superseded, whether or not
    /// [`stop`](Self::stop) was called in between.
    pub fn start(&mut self) -> SessionToken {
        let token = SessionToken::mint();
        self.state = SessionState {
            token: Some(token),
            running: true,
        };
        tracing::trace!(%token, "session started");
        token
    }

    /// Clears the running flag. The token is kept until the next start.
    pub fn stop(&mut self) {
        self.state.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// The token of the latest session, running or not.
    pub fn current_token(&self) -> Option<SessionToken> {
        self.state.token
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

impl SessionSource for SessionClock {
    fn session(&self) -> SessionState {
        self.state
    }
}
