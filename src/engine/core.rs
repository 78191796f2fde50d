use chrono::{DateTime, Duration, Utc};

use super::{
    normalize::normalize,
    types::{AnswerSet, GuessOutcome, LockoutStatus, SessionState},
};

pub const DEFAULT_COOLDOWN_SECS: u64 = 30;
pub const MAX_COOLDOWN_SECS: u64 = 7 * 24 * 3600;

/// Maszyna stanów Open/Locked. Sama niczego nie planuje ani nie usypia:
/// czas przychodzi z zewnątrz jako `now`.
#[derive(Debug, Clone)]
pub struct GuessController {
    answers: AnswerSet,
    cooldown: Duration,
}

impl GuessController {
    pub fn new(answers: AnswerSet, cooldown_secs: u64) -> Self {
        let secs = cooldown_secs.clamp(1, MAX_COOLDOWN_SECS) as i64;
        Self {
            answers,
            cooldown: Duration::seconds(secs),
        }
    }

    /// Przelicza blokadę względem zegara; wygasłą blokadę czyści.
    pub fn tick(&self, state: &mut SessionState, now: DateTime<Utc>) -> LockoutStatus {
        let Some(expiry) = state.cooldown_expiry else {
            return LockoutStatus::Open;
        };

        let remaining = expiry - now;
        if remaining <= Duration::zero() {
            state.cooldown_expiry = None;
            return LockoutStatus::Open;
        }

        let total_ms = self.cooldown.num_milliseconds().max(1) as f64;
        let remaining_ms = remaining.num_milliseconds() as f64;
        let elapsed_fraction = ((total_ms - remaining_ms) / total_ms).clamp(0.0, 1.0);

        // w dół do pełnych sekund, ale nigdy 0 dopóki trwa blokada
        let remaining_secs = (remaining.num_seconds().max(1)) as u64;

        LockoutStatus::Locked {
            remaining_secs,
            elapsed_fraction,
        }
    }

    pub fn submit(&self, state: &mut SessionState, raw: &str, now: DateTime<Utc>) -> GuessOutcome {
        if self.tick(state, now).is_locked() {
            return GuessOutcome::RejectedLocked;
        }

        let key = normalize(raw);
        if key.is_empty() {
            GuessOutcome::Empty
        } else if key == self.answers.primary {
            GuessOutcome::Win
        } else if key == self.answers.secondary {
            GuessOutcome::Partial
        } else {
            state.cooldown_expiry = Some(now + self.cooldown);
            state.last_wrong_guess = Some(raw.to_string());
            GuessOutcome::Wrong
        }
    }

    pub fn submit_now(&self, state: &mut SessionState, raw: &str) -> GuessOutcome {
        self.submit(state, raw, Utc::now())
    }
}

impl Default for GuessController {
    fn default() -> Self {
        Self::new(AnswerSet::default(), DEFAULT_COOLDOWN_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn locked_at(ctl: &GuessController) -> SessionState {
        let mut s = SessionState::new();
        assert_eq!(ctl.submit(&mut s, "John Doe", t0()), GuessOutcome::Wrong);
        s
    }

    #[test]
    fn correct_names_win_or_partial() {
        let ctl = GuessController::default();
        let mut s = SessionState::new();
        assert_eq!(ctl.submit(&mut s, "Miranda Priestly", t0()), GuessOutcome::Win);
        assert_eq!(ctl.submit(&mut s, "  jeremy BOWERS  ", t0()), GuessOutcome::Partial);
        assert_eq!(s, SessionState::new());
    }

    #[test]
    fn empty_guess_does_not_lock() {
        let ctl = GuessController::default();
        let mut s = SessionState::new();
        assert_eq!(ctl.submit(&mut s, "", t0()), GuessOutcome::Empty);
        assert_eq!(ctl.submit(&mut s, "   \t", t0()), GuessOutcome::Empty);
        assert_eq!(ctl.tick(&mut s, t0()), LockoutStatus::Open);
        assert!(s.last_wrong_guess.is_none());
    }

    #[test]
    fn wrong_guess_locks_and_records_raw_text() {
        let ctl = GuessController::default();
        let s = locked_at(&ctl);
        assert_eq!(s.cooldown_expiry, Some(t0() + Duration::seconds(30)));
        assert_eq!(s.last_wrong_guess.as_deref(), Some("John Doe"));
    }

    #[test]
    fn locked_rejects_everything_without_mutation() {
        let ctl = GuessController::default();
        let mut s = locked_at(&ctl);
        let before = s.clone();
        let later = t0() + Duration::seconds(5);
        for guess in ["Miranda Priestly", "", "Someone Else", "jeremy bowers"] {
            assert_eq!(ctl.submit(&mut s, guess, later), GuessOutcome::RejectedLocked);
            assert_eq!(s, before);
        }
    }

    #[test]
    fn tick_reports_countdown_then_opens() {
        let ctl = GuessController::default();
        let mut s = locked_at(&ctl);

        match ctl.tick(&mut s, t0() + Duration::seconds(10)) {
            LockoutStatus::Locked { remaining_secs, elapsed_fraction } => {
                assert_eq!(remaining_secs, 20);
                assert!((elapsed_fraction - 1.0 / 3.0).abs() < 1e-9);
            }
            LockoutStatus::Open => panic!("should still be locked"),
        }

        let almost = t0() + Duration::seconds(30) - Duration::milliseconds(1);
        match ctl.tick(&mut s, almost) {
            LockoutStatus::Locked { remaining_secs, .. } => assert!(remaining_secs >= 1),
            LockoutStatus::Open => panic!("should still be locked"),
        }

        let after = t0() + Duration::seconds(30) + Duration::milliseconds(1);
        assert_eq!(ctl.tick(&mut s, after), LockoutStatus::Open);
        assert!(s.cooldown_expiry.is_none());
        assert_eq!(s.last_wrong_guess.as_deref(), Some("John Doe"));
    }

    #[test]
    fn expiry_exactly_now_is_open() {
        let ctl = GuessController::default();
        let mut s = locked_at(&ctl);
        assert_eq!(ctl.tick(&mut s, t0() + Duration::seconds(30)), LockoutStatus::Open);
    }

    #[test]
    fn missed_ticks_do_not_extend_lock() {
        // brak ticków w trakcie blokady: submit sam sprawdza zegar
        let ctl = GuessController::default();
        let mut s = locked_at(&ctl);
        let much_later = t0() + Duration::minutes(10);
        assert_eq!(ctl.submit(&mut s, "Miranda Priestly", much_later), GuessOutcome::Win);
    }

    #[test]
    fn custom_cooldown_is_respected() {
        let ctl = GuessController::new(AnswerSet::default(), 5);
        let mut s = SessionState::new();
        assert_eq!(ctl.submit(&mut s, "nope", t0()), GuessOutcome::Wrong);
        assert!(ctl.tick(&mut s, t0() + Duration::seconds(4)).is_locked());
        assert_eq!(ctl.tick(&mut s, t0() + Duration::seconds(6)), LockoutStatus::Open);
    }

    #[test]
    fn win_keeps_session_open() {
        let ctl = GuessController::default();
        let mut s = SessionState::new();
        assert_eq!(ctl.submit(&mut s, "miranda priestly", t0()), GuessOutcome::Win);
        assert_eq!(ctl.submit(&mut s, "miranda priestly", t0()), GuessOutcome::Win);
        assert_eq!(ctl.submit(&mut s, "Bob", t0()), GuessOutcome::Wrong);
    }
}
