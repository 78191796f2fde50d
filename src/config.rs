use anyhow::{Context as _, Result};
use serenity::all::ChannelId;
use tracing::warn;

use crate::engine::core::{DEFAULT_COOLDOWN_SECS, MAX_COOLDOWN_SECS};

pub const DEFAULT_KILLER: &str = "Miranda Priestly";
pub const DEFAULT_ACCOMPLICE: &str = "Jeremy Bowers";
pub const DEFAULT_MAX_INFLIGHT: usize = 10;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub token: String,
    pub cooldown_secs: u64,
    pub killer_name: String,
    pub accomplice_name: String,
    pub max_inflight: usize,
    pub log_channel: Option<ChannelId>,
    pub metrics_channel: Option<ChannelId>,
}

impl GameConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Czyste parsowanie (testy podają własne źródło zmiennych).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = get("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .context("Brak DISCORD_TOKEN w środowisku")?;

        let cooldown_secs = parse_or(&get, "COOLDOWN_SECS", DEFAULT_COOLDOWN_SECS, |v: &u64| {
            (1..=MAX_COOLDOWN_SECS).contains(v)
        });
        let max_inflight = parse_or(&get, "MAX_INFLIGHT", DEFAULT_MAX_INFLIGHT, |v: &usize| *v > 0);

        let killer_name = name_or(&get, "KILLER_NAME", DEFAULT_KILLER);
        let accomplice_name = name_or(&get, "ACCOMPLICE_NAME", DEFAULT_ACCOMPLICE);

        Ok(Self {
            token,
            cooldown_secs,
            killer_name,
            accomplice_name,
            max_inflight,
            log_channel: channel(&get, "LOG_CHANNEL_ID"),
            metrics_channel: channel(&get, "METRICS_CHANNEL_ID"),
        })
    }
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = get(key).filter(|s| !s.trim().is_empty()) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            warn!(key, value = %raw, fallback = %default, "Nieprawidłowa wartość, używam domyślnej");
            default
        }
    }
}

fn name_or(get: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get(key)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

// None jeśli brak / pusta / 0
fn channel(get: &impl Fn(&str) -> Option<String>, key: &str) -> Option<ChannelId> {
    get(key)
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|&id| id != 0)
        .map(ChannelId::new)
}
