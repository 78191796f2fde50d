use dashmap::DashMap;

use super::types::SessionState;

pub trait SessionRepo {
    /// Wyłączny dostęp do sesji użytkownika na czas jednego wywołania.
    fn with_session<R>(&self, user_id: u64, f: impl FnOnce(&mut SessionState) -> R) -> R;
    /// Jak `with_session`, ale nie zakłada sesji: brak wpisu => świeży, otwarty stan.
    fn peek<R>(&self, user_id: u64, f: impl FnOnce(&mut SessionState) -> R) -> R;
    fn snapshot(&self, user_id: u64) -> Option<SessionState>;
}

#[derive(Default)]
pub struct MemorySessionRepo {
    sessions: DashMap<u64, SessionState>,
}

impl MemorySessionRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepo for MemorySessionRepo {
    fn with_session<R>(&self, user_id: u64, f: impl FnOnce(&mut SessionState) -> R) -> R {
        // blokada sharda trzymana tylko na czas `f` (bez .await w środku)
        let mut entry = self.sessions.entry(user_id).or_default();
        f(entry.value_mut())
    }

    fn peek<R>(&self, user_id: u64, f: impl FnOnce(&mut SessionState) -> R) -> R {
        match self.sessions.get_mut(&user_id) {
            Some(mut entry) => f(entry.value_mut()),
            None => f(&mut SessionState::new()),
        }
    }

    fn snapshot(&self, user_id: u64) -> Option<SessionState> {
        self.sessions.get(&user_id).map(|s| s.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::GuessController;
    use crate::engine::types::GuessOutcome;

    #[test]
    fn sessions_are_isolated_per_user() {
        let repo = MemorySessionRepo::new();
        let ctl = GuessController::default();

        let a = repo.with_session(1, |s| ctl.submit_now(s, "John Doe"));
        let b = repo.with_session(2, |s| ctl.submit_now(s, "Miranda Priestly"));
        assert_eq!(a, GuessOutcome::Wrong);
        assert_eq!(b, GuessOutcome::Win);

        assert!(repo.snapshot(1).and_then(|s| s.cooldown_expiry).is_some());
        assert!(repo.snapshot(2).and_then(|s| s.cooldown_expiry).is_none());
    }

    #[test]
    fn new_session_starts_open() {
        let repo = MemorySessionRepo::new();
        assert!(repo.snapshot(7).is_none());
        let state = repo.with_session(7, |s| s.clone());
        assert_eq!(state, SessionState::new());
    }

    #[test]
    fn peek_does_not_create_sessions() {
        let repo = MemorySessionRepo::new();
        let open = repo.peek(9, |s| s.cooldown_expiry.is_none());
        assert!(open);
        assert!(repo.snapshot(9).is_none());
    }

    #[test]
    fn peek_sees_existing_session() {
        let repo = MemorySessionRepo::new();
        let ctl = GuessController::default();
        repo.with_session(3, |s| ctl.submit_now(s, "wrong"));
        let last = repo.peek(3, |s| s.last_wrong_guess.clone());
        assert_eq!(last.as_deref(), Some("wrong"));
    }
}
