use anyhow::{Context as _, Result};
use serde::Deserialize;

const TEXTS_JSON: &str = include_str!("../texts.json");

#[derive(Debug, Clone, Deserialize)]
pub struct Texts {
    pub title: String,
    pub prompt: String,
    pub input_label: String,
    pub input_placeholder: String,
    pub tip: String,
    pub empty: OutcomeText,
    pub win: OutcomeText,
    pub partial: OutcomeText,
    pub wrong: OutcomeText,
    pub locked_title: String,
    pub locked_note: String,
    pub open_note: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeText {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Texts {
    pub fn load() -> Result<Self> {
        Self::parse(TEXTS_JSON)
    }

    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Błędny JSON w texts.json")
    }

    /// Wstawia skonfigurowane imiona w placeholdery `{killer}` / `{accomplice}`.
    pub fn with_names(mut self, killer: &str, accomplice: &str) -> Self {
        for t in [&mut self.empty, &mut self.win, &mut self.partial, &mut self.wrong] {
            t.fill(killer, accomplice);
        }
        self
    }
}

impl OutcomeText {
    fn fill(&mut self, killer: &str, accomplice: &str) {
        let sub = |s: &str| s.replace("{killer}", killer).replace("{accomplice}", accomplice);
        self.title = sub(&self.title);
        self.body = sub(&self.body);
        self.caption = self.caption.as_deref().map(sub);
    }
}
