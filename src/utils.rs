use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serenity::all::{ChannelId, CreateAllowedMentions, CreateEmbed, CreateMessage, Http, User};

/// Pasek 10 segmentów dla wartości 0..=100.
pub fn bar10(value_0_100: u32) -> String {
    let width = 10u32;
    let filled = (value_0_100.min(100) * width + 99) / 100;
    (0..width)
        .map(|i| if i < filled { '▰' } else { '▱' })
        .collect()
}

/// Procent upłynięcia blokady, jak w `int(100 * elapsed / total)`.
pub fn percent(fraction: f64) -> u32 {
    (fraction.clamp(0.0, 1.0) * 100.0).floor() as u32
}

pub fn countdown_bar(elapsed_fraction: f64, remaining_secs: u64) -> String {
    let pct = percent(elapsed_fraction);
    format!("[{}] {}%\n**{}** seconds remaining…", bar10(pct), pct, remaining_secs)
}

/// Limit Discorda na wartość pola embeda.
pub const EMBED_FIELD_LIMIT: usize = 1024;
/// Tyle znaków odpowiedzi pokazujemy w embedach.
pub const GUESS_DISPLAY_CHARS: usize = 100;

/// Przycina tekst do `max_chars` znaków (nie bajtów), dokleja „…” gdy coś ucięto.
pub fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Log rozwiązania sprawy na kanał (best effort, wołane w tle).
pub async fn log_solved(http: Arc<Http>, channel_id: ChannelId, user: User, guess: String) -> Result<()> {
    let embed = CreateEmbed::new()
        .title("🕵️ Log: Sprawa rozwiązana (/guess)")
        .description(format!("**{}** (`{}`) wskazał prawdziwego sprawcę.", user.name, user.id.get()))
        .field("Odpowiedź", format!("`{}`", clip(guess.trim(), GUESS_DISPLAY_CHARS)), true)
        .color(0x33CC33)
        .timestamp(Utc::now());

    channel_id
        .send_message(
            &http,
            CreateMessage::new()
                .allowed_mentions(CreateAllowedMentions::new())
                .embed(embed),
        )
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(bar10(0), "▱▱▱▱▱▱▱▱▱▱");
        assert_eq!(bar10(50), "▰▰▰▰▰▱▱▱▱▱");
        assert_eq!(bar10(100), "▰▰▰▰▰▰▰▰▰▰");
        assert_eq!(bar10(250), "▰▰▰▰▰▰▰▰▰▰");
    }

    #[test]
    fn clip_counts_chars_not_bytes() {
        assert_eq!(clip("John Doe", 100), "John Doe");
        assert_eq!(clip("abcdef", 4), "abc…");
        let long = "ż".repeat(1500);
        let clipped = clip(&long, GUESS_DISPLAY_CHARS);
        assert_eq!(clipped.chars().count(), GUESS_DISPLAY_CHARS);
        assert!(clipped.ends_with('…'));
    }

    #[test]
    fn percent_truncates_and_clamps() {
        assert_eq!(percent(1.0 / 3.0), 33);
        assert_eq!(percent(-0.5), 0);
        assert_eq!(percent(1.7), 100);
    }

    #[test]
    fn countdown_text_mentions_seconds() {
        let s = countdown_bar(0.5, 15);
        assert!(s.contains("50%"));
        assert!(s.contains("**15** seconds remaining"));
    }
}
