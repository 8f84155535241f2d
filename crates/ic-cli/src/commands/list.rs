use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use ic_content::{ContentKind, LexiconType, OriginScope, Repository};

pub fn run(dir: &Path, kind: &str) -> Result<(), String> {
    let repo = super::load_repo(dir)?;
    let kind = super::parse_kind(kind)?;

    let (header, rows) = rows(&repo, kind);
    if rows.is_empty() {
        println!("  No {kind} records found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    let count = rows.len();
    for row in rows {
        table.add_row(row);
    }

    println!("{table}");
    println!();
    println!("  {count} {kind} records");

    Ok(())
}

fn rows(repo: &Repository, kind: ContentKind) -> (Vec<&'static str>, Vec<Vec<String>>) {
    match kind {
        ContentKind::Place => (
            vec!["Id", "Name", "Zone", "Threshold"],
            repo.places()
                .iter()
                .map(|p| {
                    vec![
                        p.place_id.clone(),
                        p.name().to_string(),
                        p.zone_id.clone(),
                        if p.is_threshold { "yes" } else { "" }.to_string(),
                    ]
                })
                .collect(),
        ),
        ContentKind::Zone => (
            vec!["Id", "Places"],
            repo.zones()
                .iter()
                .map(|z| vec![z.zone_id.clone(), z.place_ids.join(", ")])
                .collect(),
        ),
        ContentKind::Npc => (
            vec!["Id", "Name", "Kind", "Home"],
            repo.npcs()
                .iter()
                .map(|n| {
                    vec![
                        n.npc_id.clone(),
                        super::truncate(n.display_name.as_deref(), 30),
                        super::truncate(n.npc_kind.as_deref(), 20),
                        super::truncate(n.home_place_id.as_deref(), 30),
                    ]
                })
                .collect(),
        ),
        ContentKind::Item => (
            vec!["Id", "Name", "Origin", "Need"],
            repo.items()
                .iter()
                .map(|i| {
                    let origin = match (i.origin_scope, i.origin_ref.as_deref()) {
                        (OriginScope::Global, _) => "global".to_string(),
                        (OriginScope::Place, Some(r)) => format!("place {r}"),
                        (OriginScope::Zone, Some(r)) => format!("zone {r}"),
                        _ => "—".to_string(),
                    };
                    vec![
                        i.item_id.clone(),
                        i.name().to_string(),
                        origin,
                        super::truncate(i.player_need_satisfied.as_deref(), 20),
                    ]
                })
                .collect(),
        ),
        ContentKind::Interaction => (
            vec!["Id", "Npc kind", "Prompt"],
            repo.interactions()
                .iter()
                .map(|i| {
                    vec![
                        i.interaction_id.clone(),
                        i.npc_kind.clone(),
                        super::truncate(i.prompt.as_deref(), 50),
                    ]
                })
                .collect(),
        ),
        ContentKind::Recipe => (
            vec!["Id", "Type", "Name", "Ingredients"],
            repo.recipes()
                .iter()
                .map(|r| {
                    let refs: Vec<&str> = r
                        .ingredients
                        .iter()
                        .map(|i| i.ingredient_ref.as_str())
                        .collect();
                    vec![
                        r.recipe_id.clone(),
                        r.entry_type.to_string(),
                        super::truncate(r.display_name.as_deref(), 30),
                        refs.join(", "),
                    ]
                })
                .collect(),
        ),
        ContentKind::Lexicon => (
            vec!["Key", "Type", "Scope", "Words"],
            repo.lexicon()
                .iter()
                .map(|l| {
                    let ty = match l.lexicon_type {
                        LexiconType::Sensory => "sensory",
                        LexiconType::NotAllowed => "not allowed",
                    };
                    vec![
                        l.key.clone(),
                        ty.to_string(),
                        l.scope.to_string(),
                        super::truncate(Some(l.words.join(", ").as_str()), 50),
                    ]
                })
                .collect(),
        ),
        ContentKind::JournalTemplate => (
            vec!["Id", "Type", "Tags"],
            repo.templates()
                .iter()
                .map(|t| {
                    vec![
                        t.template_id.clone(),
                        t.entry_type.to_string(),
                        t.tags.join(", "),
                    ]
                })
                .collect(),
        ),
        ContentKind::NarrativeUnit => (
            vec!["Id", "Place", "Type", "Title"],
            repo.units()
                .iter()
                .map(|u| {
                    vec![
                        u.unit_id.clone(),
                        u.place_id.clone(),
                        u.entry_type.to_string(),
                        super::truncate(u.title.as_deref(), 40),
                    ]
                })
                .collect(),
        ),
    }
}
