use chrono::{DateTime, Utc};
use serenity::all::ChannelId;
use tracing::{debug, info};

use crate::{
    config::GameConfig,
    engine::{
        core::GuessController,
        repo::{MemorySessionRepo, SessionRepo},
        types::{AnswerSet, GuessOutcome, LockoutStatus},
    },
    texts::Texts,
};

/// Wszystko, czego potrzebuje warstwa Discorda: sesje, maszyna stanów i teksty.
/// Żyje w `Handler`, nie jako globalny singleton.
pub struct Game {
    pub sessions: MemorySessionRepo,
    pub controller: GuessController,
    pub texts: Texts,
    pub log_channel: Option<ChannelId>,
}

/// Migawka po jednym wywołaniu `submit`/`tick`, gotowa do renderu.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessView {
    pub outcome: Option<GuessOutcome>,
    pub status: LockoutStatus,
    pub last_wrong_guess: Option<String>,
}

impl Game {
    pub fn new(controller: GuessController, texts: Texts, log_channel: Option<ChannelId>) -> Self {
        Self {
            sessions: MemorySessionRepo::new(),
            controller,
            texts,
            log_channel,
        }
    }

    pub fn from_config(cfg: &GameConfig, texts: Texts) -> Self {
        let answers = AnswerSet::new(&cfg.killer_name, &cfg.accomplice_name);
        Self::new(
            GuessController::new(answers, cfg.cooldown_secs),
            texts.with_names(cfg.killer_name.trim(), cfg.accomplice_name.trim()),
            cfg.log_channel,
        )
    }

    pub fn submit_at(&self, user_id: u64, raw: &str, now: DateTime<Utc>) -> GuessView {
        let view = self.sessions.with_session(user_id, |s| {
            let outcome = self.controller.submit(s, raw, now);
            let status = self.controller.tick(s, now);
            GuessView {
                outcome: Some(outcome),
                status,
                last_wrong_guess: s.last_wrong_guess.clone(),
            }
        });

        match view.outcome {
            Some(GuessOutcome::RejectedLocked) => debug!(user_id, "guess rejected, session locked"),
            Some(o) => info!(user_id, outcome = o.as_str(), "guess evaluated"),
            None => {}
        }
        view
    }

    pub fn status_at(&self, user_id: u64, now: DateTime<Utc>) -> GuessView {
        self.sessions.peek(user_id, |s| GuessView {
            outcome: None,
            status: self.controller.tick(s, now),
            last_wrong_guess: s.last_wrong_guess.clone(),
        })
    }

    pub fn submit(&self, user_id: u64, raw: &str) -> GuessView {
        self.submit_at(user_id, raw, Utc::now())
    }

    pub fn status(&self, user_id: u64) -> GuessView {
        self.status_at(user_id, Utc::now())
    }
}
