use std::path::Path;

use ic_content::{ContentKind, ContentResult, Repository};
use serde::Serialize;

pub fn run(dir: &Path, kind: &str, id: &str) -> Result<(), String> {
    let repo = super::load_repo(dir)?;
    let kind = super::parse_kind(kind)?;

    let json = record_json(&repo, kind, id)
        .map_err(|e| e.to_string())?
        .map_err(|e| format!("failed to serialize {kind} \"{id}\": {e}"))?;
    println!("{json}");

    Ok(())
}

fn record_json(
    repo: &Repository,
    kind: ContentKind,
    id: &str,
) -> ContentResult<serde_json::Result<String>> {
    fn pretty<T: Serialize>(record: &T) -> serde_json::Result<String> {
        serde_json::to_string_pretty(record)
    }

    Ok(match kind {
        ContentKind::Place => pretty(repo.place(id)?),
        ContentKind::Zone => pretty(repo.zone(id)?),
        ContentKind::Npc => pretty(repo.npc(id)?),
        ContentKind::Item => pretty(repo.item(id)?),
        ContentKind::Interaction => pretty(repo.interaction(id)?),
        ContentKind::Recipe => pretty(repo.recipe(id)?),
        ContentKind::Lexicon => pretty(repo.lexicon_entry(id)?),
        ContentKind::JournalTemplate => pretty(repo.template(id)?),
        ContentKind::NarrativeUnit => pretty(repo.unit(id)?),
    })
}
