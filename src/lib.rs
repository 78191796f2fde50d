use std::{sync::Arc, time::Instant};

use chrono::Utc;
use dashmap::DashMap;
use dotenvy::dotenv;
use serenity::all::*;
use serenity::async_trait;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

pub mod config;
pub mod engine;
pub mod game;
pub mod texts;
pub mod utils;

mod commands;
use commands::guess;

use crate::{config::GameConfig, game::Game, texts::Texts};

// ----------------------------
// Entrypoint
// ----------------------------

pub fn init_tracing() {
    // nie wywali się, jeśli już zainicjalizowane
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();
    dotenv().ok();

    let cfg = GameConfig::from_env()?;
    let texts = Texts::load()?;
    let game = Arc::new(Game::from_config(&cfg, texts));

    info!(
        cooldown_secs = cfg.cooldown_secs,
        max_inflight = cfg.max_inflight,
        "Konfiguracja wczytana"
    );

    // --- anty-spam + throttling ---
    let inflight: Arc<DashMap<(u64, String), Instant>> = Arc::new(DashMap::new());
    let semaphore = Arc::new(Semaphore::new(cfg.max_inflight));

    // --- Discord ---
    let intents = GatewayIntents::non_privileged();

    let mut client = Client::builder(&cfg.token, intents)
        .event_handler(Handler {
            game,
            inflight,
            semaphore,
            metrics_channel: cfg.metrics_channel,
        })
        .await?;

    client.start().await?;
    Ok(())
}

// ----------------------------
// Handler
// ----------------------------
struct Handler {
    game: Arc<Game>,
    inflight: Arc<DashMap<(u64, String), Instant>>, // (user_id, command)
    semaphore: Arc<Semaphore>,
    metrics_channel: Option<ChannelId>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, "Bot jest online");

        let mut c = CreateCommand::new("guess");
        guess::register(&mut c);

        if let Err(err) = Command::set_global_commands(&ctx.http, vec![c]).await {
            error!(error = ?err, "Nie udało się ustawić globalnych komend");
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Component(component) => {
                if component.data.custom_id.starts_with("guess:") {
                    if let Err(e) = guess::handle_component(&ctx, &component, &self.game).await {
                        error!(error = ?e, "Błąd komponentu guess");
                    }
                } else {
                    let _ = component
                        .create_response(
                            &ctx.http,
                            CreateInteractionResponse::Message(
                                CreateInteractionResponseMessage::new()
                                    .ephemeral(true)
                                    .content("⚠️ This interaction is no longer supported. Use /guess again."),
                            ),
                        )
                        .await;
                }
            }

            Interaction::Modal(modal) => {
                if modal.data.custom_id.starts_with("guess:") {
                    if let Err(e) = guess::handle_modal(&ctx, &modal, &self.game).await {
                        error!(error = ?e, "Błąd modala guess");
                    }
                } else {
                    let _ = modal
                        .create_response(
                            &ctx.http,
                            CreateInteractionResponse::Message(
                                CreateInteractionResponseMessage::new()
                                    .ephemeral(true)
                                    .content("⚠️ Unknown interaction."),
                            ),
                        )
                        .await;
                }
            }

            Interaction::Command(cmd) => {
                let user_id = cmd.user.id.get();
                let name = cmd.data.name.as_str();

                // anti-spam: (user, command)
                let key = (user_id, name.to_owned());
                use dashmap::mapref::entry::Entry;
                match self.inflight.entry(key.clone()) {
                    Entry::Occupied(_) => {
                        let _ = cmd
                            .create_response(
                                &ctx.http,
                                CreateInteractionResponse::Message(
                                    CreateInteractionResponseMessage::new()
                                        .ephemeral(true)
                                        .content("⏳ This command is already running, give me a moment…"),
                                ),
                            )
                            .await;
                        return;
                    }
                    Entry::Vacant(v) => {
                        v.insert(Instant::now());
                    }
                }

                // guard usuwający wpis z inflight
                let guard = InFlightGuard {
                    key,
                    map: self.inflight.clone(),
                };

                // globalny limit równoległości
                let _permit = match self.semaphore.clone().acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => {
                        let _ = cmd
                            .create_response(
                                &ctx.http,
                                CreateInteractionResponse::Message(
                                    CreateInteractionResponseMessage::new()
                                        .ephemeral(true)
                                        .content("🛠️ The bot is restarting. Try again in a moment."),
                                ),
                            )
                            .await;
                        return;
                    }
                };

                let start_total = Instant::now();
                let result = match name {
                    "guess" => guess::run(&ctx, &cmd, &self.game).await,
                    _ => Ok(()),
                };

                drop(guard);

                let total_ms = start_total.elapsed().as_millis() as u64;
                let ok = result.is_ok();

                if let Err(e) = result {
                    error!(command = name, error = ?e, "Błąd komendy");
                }

                if let Some(ch) = self.metrics_channel {
                    let http: Arc<Http> = ctx.http.clone();
                    let uname = cmd.user.name.clone();
                    let cname = name.to_string();

                    tokio::spawn(async move {
                        if let Err(e) = log_command_metric_http(http, ch, uname, user_id, cname, total_ms, ok).await {
                            warn!(error = ?e, "Nie udało się wysłać metryki");
                        }
                    });
                }
            }

            _ => {} // ignorujemy inne typy interakcji
        }
    }
}

// guard usuwający wpis z inflight
struct InFlightGuard {
    key: (u64, String),
    map: Arc<DashMap<(u64, String), Instant>>,
}
impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.map.remove(&self.key);
    }
}

// ===== Helpers: metryki =====

async fn log_command_metric_http(
    http: Arc<Http>,
    channel_id: ChannelId,
    user_name: String,
    user_id: u64,
    command_name: String,
    total_ms: u64,
    ok: bool,
) -> anyhow::Result<()> {
    let status = if ok { "✅ OK" } else { "❌ ERR" };

    let embed = CreateEmbed::new()
        .title("⏱️ Metryka komendy")
        .field("Komenda", format!("/{}", command_name), true)
        .field("Użytkownik", format!("{} (`{}`)", user_name, user_id), true)
        .field("Całkowity czas", format!("{total_ms} ms"), true)
        .field("Status", status, true)
        .timestamp(Utc::now());

    let msg = CreateMessage::new()
        .allowed_mentions(CreateAllowedMentions::new())
        .embed(embed);

    channel_id.send_message(&http, msg).await?;
    Ok(())
}
