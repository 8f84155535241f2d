use std::path::Path;

use ic_engine::{PlayerState, generate_candidates};

pub fn run(dir: &Path, place: &str, seed: u64, count: usize) -> Result<(), String> {
    let repo = super::load_repo(dir)?;
    let state = PlayerState::new("preview", place);

    let units = generate_candidates(&state, &repo, seed, count.max(1)).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&units).map_err(|e| e.to_string())?;
    println!("{json}");

    Ok(())
}
