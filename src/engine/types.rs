use chrono::{DateTime, Utc};

use super::normalize::{normalize, GuessKey};

/// Wynik jednej próby zgadywania.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Empty,
    Win,
    Partial, // wspólnik, nie prawdziwy sprawca
    Wrong,
    RejectedLocked,
}

impl GuessOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Win => "win",
            Self::Partial => "partial",
            Self::Wrong => "wrong",
            Self::RejectedLocked => "rejected_locked",
        }
    }
}

/// Stan blokady widziany przez warstwę prezentacji.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockoutStatus {
    Open,
    Locked {
        remaining_secs: u64,
        elapsed_fraction: f64, // 0.0..=1.0, do paska postępu
    },
}

impl LockoutStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}

/// Znormalizowane odpowiedzi, ustalane raz przy starcie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSet {
    pub primary: GuessKey,
    pub secondary: GuessKey,
}

impl AnswerSet {
    pub fn new(primary: &str, secondary: &str) -> Self {
        Self {
            primary: normalize(primary),
            secondary: normalize(secondary),
        }
    }
}

impl Default for AnswerSet {
    fn default() -> Self {
        Self::new("Miranda Priestly", "Jeremy Bowers")
    }
}

/// Stan jednej sesji gracza.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub cooldown_expiry: Option<DateTime<Utc>>,
    pub last_wrong_guess: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }
}
