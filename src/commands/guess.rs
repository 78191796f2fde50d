//! commands/guess.rs — /guess: zgadywanie sprawcy z blokadą po błędnej odpowiedzi

use std::sync::Arc;

use anyhow::Result;
use serenity::all::{
    ActionRowComponent, ButtonStyle, CommandInteraction, CommandOptionType, ComponentInteraction,
    Context, CreateActionRow, CreateButton, CreateCommand, CreateCommandOption, CreateEmbed,
    CreateEmbedFooter, CreateInputText, CreateInteractionResponse, CreateInteractionResponseMessage,
    CreateModal, EditInteractionResponse, InputTextStyle, ModalInteraction, ModalInteractionData, User,
};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, warn};

use crate::{
    engine::types::{GuessOutcome, LockoutStatus},
    game::{Game, GuessView},
    texts::{OutcomeText, Texts},
    utils::{clip, countdown_bar, log_solved, GUESS_DISPLAY_CHARS},
};

// custom_id komponentów
pub const BTN_OPEN: &str = "guess:open";
pub const BTN_REFRESH: &str = "guess:refresh";
pub const MODAL_ID: &str = "guess:modal";
pub const MODAL_INPUT: &str = "guess:modal:name";

const OPT_NAME: &str = "name";

const COLOR_OPEN: u32 = 0x3b82f6;
const COLOR_EMPTY: u32 = 0xFFA500;
const COLOR_WIN: u32 = 0x33CC33;
const COLOR_PARTIAL: u32 = 0xf39c12;
const COLOR_LOCKED: u32 = 0xe74c3c;

// ========================
// 🧾 Rejestracja komendy
// ========================

pub fn register(cmd: &mut CreateCommand) -> &mut CreateCommand {
    *cmd = CreateCommand::new("guess")
        .description("Did you find the killer? 🕵️")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                OPT_NAME,
                "Full name of the killer (first and last)",
            )
            .required(false)
            .max_length(GUESS_DISPLAY_CHARS as u16),
        );
    cmd
}

// ========================
// ▶️ Slash / komponenty / modal
// ========================

pub async fn run(ctx: &Context, cmd: &CommandInteraction, game: &Arc<Game>) -> Result<()> {
    let user_id = cmd.user.id.get();

    let guess = cmd
        .data
        .options
        .iter()
        .find(|o| o.name == OPT_NAME)
        .and_then(|o| o.value.as_str())
        .map(str::to_owned);

    let view = match guess {
        Some(raw) => {
            let view = game.submit(user_id, &raw);
            respond_new(ctx, Origin::Command(cmd.clone()), game, &view).await?;
            follow_up(ctx, Origin::Command(cmd.clone()), game, &cmd.user, &raw, &view);
            return Ok(());
        }
        None => game.status(user_id),
    };

    // bez argumentu: modal, chyba że trwa blokada
    if view.status.is_locked() {
        respond_new(ctx, Origin::Command(cmd.clone()), game, &view).await?;
        spawn_countdown(ctx.clone(), Origin::Command(cmd.clone()), game.clone(), user_id);
    } else {
        cmd.create_response(&ctx.http, CreateInteractionResponse::Modal(answer_modal(&game.texts)))
            .await?;
    }
    Ok(())
}

pub async fn handle_component(ctx: &Context, ic: &ComponentInteraction, game: &Arc<Game>) -> Result<()> {
    let user_id = ic.user.id.get();
    let view = game.status(user_id);

    match ic.data.custom_id.as_str() {
        BTN_OPEN if !view.status.is_locked() => {
            ic.create_response(&ctx.http, CreateInteractionResponse::Modal(answer_modal(&game.texts)))
                .await?;
        }
        BTN_OPEN | BTN_REFRESH => {
            let (embed, rows) = render(&game.texts, &view);
            ic.create_response(
                &ctx.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embeds(vec![embed])
                        .components(rows),
                ),
            )
            .await?;
            if view.status.is_locked() && ic.data.custom_id == BTN_OPEN {
                spawn_countdown(ctx.clone(), Origin::Component(ic.clone()), game.clone(), user_id);
            }
        }
        _ => {}
    }
    Ok(())
}

pub async fn handle_modal(ctx: &Context, modal: &ModalInteraction, game: &Arc<Game>) -> Result<()> {
    if modal.data.custom_id != MODAL_ID {
        return Ok(());
    }

    let raw = input_value(&modal.data).unwrap_or_default();
    let view = game.submit(modal.user.id.get(), &raw);

    respond_new(ctx, Origin::Modal(modal.clone()), game, &view).await?;
    follow_up(ctx, Origin::Modal(modal.clone()), game, &modal.user, &raw, &view);
    Ok(())
}

/// Wartość pola odpowiedzi; brak wartości i pusty tekst trafiają potem do `Empty`.
fn input_value(data: &ModalInteractionData) -> Option<String> {
    data.components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|c| match c {
            ActionRowComponent::InputText(input) if input.custom_id == MODAL_INPUT => input.value.clone(),
            _ => None,
        })
}

fn answer_modal(texts: &Texts) -> CreateModal {
    let input = CreateInputText::new(InputTextStyle::Short, &texts.input_label, MODAL_INPUT)
        .placeholder(&texts.input_placeholder)
        .required(false)
        .max_length(GUESS_DISPLAY_CHARS as u16);

    CreateModal::new(MODAL_ID, &texts.title).components(vec![CreateActionRow::InputText(input)])
}

// ========================
// ⏳ Odliczanie i efekty uboczne
// ========================

/// Źródło odpowiedzi, którą odliczanie może potem edytować.
#[derive(Clone)]
enum Origin {
    Command(CommandInteraction),
    Component(ComponentInteraction),
    Modal(ModalInteraction),
}

impl Origin {
    async fn create(&self, ctx: &Context, resp: CreateInteractionResponse) -> Result<()> {
        match self {
            Self::Command(i) => i.create_response(&ctx.http, resp).await?,
            Self::Component(i) => i.create_response(&ctx.http, resp).await?,
            Self::Modal(i) => i.create_response(&ctx.http, resp).await?,
        }
        Ok(())
    }

    async fn edit(&self, ctx: &Context, edit: EditInteractionResponse) -> Result<()> {
        match self {
            Self::Command(i) => i.edit_response(&ctx.http, edit).await?,
            Self::Component(i) => i.edit_response(&ctx.http, edit).await?,
            Self::Modal(i) => i.edit_response(&ctx.http, edit).await?,
        };
        Ok(())
    }
}

async fn respond_new(ctx: &Context, origin: Origin, game: &Game, view: &GuessView) -> Result<()> {
    let (embed, rows) = render(&game.texts, view);
    origin
        .create(
            ctx,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .ephemeral(true)
                    .embeds(vec![embed])
                    .components(rows),
            ),
        )
        .await
}

fn follow_up(ctx: &Context, origin: Origin, game: &Arc<Game>, user: &User, raw: &str, view: &GuessView) {
    if view.status.is_locked() {
        spawn_countdown(ctx.clone(), origin, game.clone(), user.id.get());
    }

    if view.outcome == Some(GuessOutcome::Win) {
        if let Some(ch) = game.log_channel {
            let http = ctx.http.clone();
            let user = user.clone();
            let guess = raw.to_string();
            tokio::spawn(async move {
                if let Err(e) = log_solved(http, ch, user, guess).await {
                    warn!(error = ?e, "Nie udało się wysłać logu rozwiązania");
                }
            });
        }
    }
}

/// Co sekundę czyta zegar przez `tick` i przerysowuje wiadomość, aż blokada minie.
/// Zadanie nie trzyma żadnej blokady między `.await` i kończy się, gdy edycja
/// wiadomości się nie uda (np. wiadomość zniknęła).
fn spawn_countdown(ctx: Context, origin: Origin, game: Arc<Game>, user_id: u64) {
    tokio::spawn(async move {
        let mut every = interval(Duration::from_secs(1));
        every.set_missed_tick_behavior(MissedTickBehavior::Skip);
        every.tick().await; // pierwszy tick jest natychmiastowy

        loop {
            every.tick().await;

            let view = game.status(user_id);
            let done = !view.status.is_locked();
            let (embed, rows) = render(&game.texts, &view);

            let edit = EditInteractionResponse::new().embeds(vec![embed]).components(rows);
            if let Err(e) = origin.edit(&ctx, edit).await {
                debug!(user_id, error = ?e, "countdown stopped, message not editable");
                break;
            }
            if done {
                break;
            }
        }
    });
}

// ========================
// 🎨 Render
// ========================

/// Widok niezależny od serenity (łatwy do testowania).
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub body: String,
    pub color: u32,
    pub image_url: Option<String>,
    pub last_guess: Option<String>,
    pub footer: String,
    pub check_enabled: bool,
    pub show_refresh: bool,
}

pub fn panel(texts: &Texts, view: &GuessView) -> Panel {
    let last_guess = view
        .last_wrong_guess
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(|g| clip(g, GUESS_DISPLAY_CHARS));

    let from_text = |t: &OutcomeText, color: u32| {
        let mut body = t.body.clone();
        if let Some(caption) = &t.caption {
            body.push_str(&format!("\n\n*{caption}*"));
        }
        (t.title.clone(), body, color, t.image_url.clone())
    };

    let (title, body, color, image_url) = match (view.status, view.outcome) {
        (LockoutStatus::Locked { remaining_secs, elapsed_fraction }, outcome) => {
            let title = if outcome == Some(GuessOutcome::Wrong) {
                texts.wrong.title.clone()
            } else {
                texts.locked_title.clone()
            };
            let mut body = texts.wrong.body.clone();
            body.push_str("\n\n");
            body.push_str(&countdown_bar(elapsed_fraction, remaining_secs));
            if let Some(caption) = &texts.wrong.caption {
                body.push_str(&format!("\n\n*{caption}*"));
            }
            body.push_str(&format!("\n{}", texts.locked_note));
            (title, body, COLOR_LOCKED, texts.wrong.image_url.clone())
        }
        (LockoutStatus::Open, Some(GuessOutcome::Empty)) => from_text(&texts.empty, COLOR_EMPTY),
        (LockoutStatus::Open, Some(GuessOutcome::Win)) => from_text(&texts.win, COLOR_WIN),
        (LockoutStatus::Open, Some(GuessOutcome::Partial)) => from_text(&texts.partial, COLOR_PARTIAL),
        (LockoutStatus::Open, _) => {
            let body = if last_guess.is_some() {
                format!("{}\n{}", texts.open_note, texts.prompt)
            } else {
                texts.prompt.clone()
            };
            (texts.title.clone(), body, COLOR_OPEN, None)
        }
    };

    let locked = view.status.is_locked();
    Panel {
        title,
        body,
        color,
        image_url,
        last_guess,
        footer: texts.tip.clone(),
        check_enabled: !locked,
        show_refresh: locked,
    }
}

fn render(texts: &Texts, view: &GuessView) -> (CreateEmbed, Vec<CreateActionRow>) {
    let p = panel(texts, view);

    let mut embed = CreateEmbed::new()
        .title(&p.title)
        .description(&p.body)
        .color(p.color)
        .footer(CreateEmbedFooter::new(&p.footer));
    if let Some(url) = &p.image_url {
        embed = embed.image(url);
    }
    if let Some(last) = &p.last_guess {
        embed = embed.field("Last guess", format!("*{last}*"), false);
    }

    let mut buttons = vec![CreateButton::new(BTN_OPEN)
        .label("🔎 Check")
        .style(ButtonStyle::Primary)
        .disabled(!p.check_enabled)];
    if p.show_refresh {
        buttons.push(
            CreateButton::new(BTN_REFRESH)
                .label("🔄 Refresh")
                .style(ButtonStyle::Secondary),
        );
    }

    (embed, vec![CreateActionRow::Buttons(buttons)])
}
