use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use colored::Colorize;
use ic_content::Repository;
use ic_engine::{
    Command, Engine, EngineConfig, EngineError, MemoryStore, PlayerRecord, Session, SessionStore,
    StepResult, match_intent, play_turn,
};
use serde::{Deserialize, Serialize};

/// Everything a session needs between invocations.
#[derive(Serialize, Deserialize)]
struct SaveFile {
    session: Session,
    store: MemoryStore,
}

impl SaveFile {
    fn read(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("cannot read save file {}: {e}", path.display()))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("invalid save file {}: {e}", path.display()))
    }

    fn write(&self, path: &Path) -> Result<(), String> {
        let text = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, text).map_err(|e| format!("cannot write save file {}: {e}", path.display()))
    }
}

/// How the player named their choice.
pub enum ChoiceArg {
    Absent,
    Id(String),
    Say(String),
}

impl ChoiceArg {
    pub fn from_flags(choice: Option<String>, say: Option<String>) -> Self {
        match (choice, say) {
            (Some(id), _) => Self::Id(id),
            (None, Some(text)) => Self::Say(text),
            (None, None) => Self::Absent,
        }
    }
}

pub fn begin(dir: &Path, save: &Path, place: &str, seed: u64, player: &str) -> Result<(), String> {
    let repo = super::load_repo(dir)?;

    let mut store = MemoryStore::new();
    let record = PlayerRecord::new(player);
    let player_id = record.player_id.clone();
    store.insert_player(record);

    let session =
        Session::begin(&mut store, &repo, &player_id, place, seed).map_err(|e| e.to_string())?;
    println!(
        "  {} session {} at '{place}'",
        "Started".bold(),
        session.session_id.dimmed()
    );
    SaveFile { session, store }.write(save)
}

pub fn step(
    dir: &Path,
    save: &Path,
    command: &str,
    choice: ChoiceArg,
    markdown: bool,
    date: Option<&str>,
) -> Result<(), String> {
    let repo = super::load_repo(dir)?;
    let command: Command = command.parse().map_err(|e: EngineError| e.to_string())?;

    let mut config = EngineConfig::default();
    if let Some(date) = date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| format!("invalid date \"{date}\": {e}"))?;
        config = config.with_journal_date(date);
    }
    let engine = Engine::new(config);

    let mut save_file = SaveFile::read(save)?;
    let choice_id = resolve_choice(&engine, &repo, &save_file, choice)?;

    let SaveFile { session, store } = &mut save_file;
    let result = play_turn(store, session, &repo, &engine, command, choice_id.as_deref())
        .map_err(|e| e.to_string())?;
    save_file.write(save)?;

    if markdown {
        print_markdown(&result);
    } else {
        let json = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
        println!("{json}");
    }

    Ok(())
}

pub fn journal(save: &Path) -> Result<(), String> {
    let SaveFile { session, store } = SaveFile::read(save)?;
    let pages = store
        .list_journal(&session.session_id)
        .map_err(|e| e.to_string())?;

    if pages.is_empty() {
        println!("  The journal is empty.");
        return Ok(());
    }
    for page in &pages {
        println!("{}", page.to_markdown());
    }

    Ok(())
}

/// Turn `--say` text into a choice id against the offer currently on screen.
fn resolve_choice(
    engine: &Engine,
    repo: &Repository,
    save: &SaveFile,
    choice: ChoiceArg,
) -> Result<Option<String>, String> {
    let text = match choice {
        ChoiceArg::Absent => return Ok(None),
        ChoiceArg::Id(id) => return Ok(Some(id)),
        ChoiceArg::Say(text) => text,
    };

    let state = save
        .store
        .get_state(&save.session.session_id)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("unknown session: {}", save.session.session_id))?;
    let offer = engine
        .current_offer(&state, repo, save.session.offer_seed)
        .map_err(|e| e.to_string())?;
    let views = offer.unit.choice_views();

    match_intent(&text, &views, engine.config().intent_min_keyword_len)
        .map(|c| Some(c.choice_id.clone()))
        .ok_or_else(|| format!("could not tell which choice \"{text}\" means"))
}

fn print_markdown(result: &StepResult) {
    if let Some(page) = &result.journal_page {
        println!("{}", page.to_markdown());
    }
    if let Some(title) = &result.unit.title {
        println!("  {}", title.bold());
    }
    if let Some(prompt) = &result.unit.prompt {
        println!("  {prompt}");
    }
    println!();
    for choice in &result.choices {
        println!("  [{}] {}", choice.choice_id.cyan(), choice.label);
    }
}
