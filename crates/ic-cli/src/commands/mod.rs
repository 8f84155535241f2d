pub mod check;
pub mod generate;
pub mod list;
pub mod play;
pub mod show;

use std::path::Path;

use ic_content::{ContentKind, Repository};

/// Open and validate the content pack at `dir`.
fn load_repo(dir: &Path) -> Result<Repository, String> {
    tracing::debug!(dir = %dir.display(), "opening content");
    Repository::open(dir).map_err(|e| format!("failed to load content from {}: {e}", dir.display()))
}

/// Parse a kind argument.
fn parse_kind(kind: &str) -> Result<ContentKind, String> {
    ContentKind::parse(kind).ok_or_else(|| {
        let known: Vec<&str> = ContentKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown kind \"{kind}\" (expected one of: {})", known.join(", "))
    })
}

/// Shorten free text for a table cell.
fn truncate(text: Option<&str>, max: usize) -> String {
    match text {
        None | Some("") => "—".to_string(),
        Some(t) if t.chars().count() > max => {
            let cut: String = t.chars().take(max - 3).collect();
            format!("{cut}...")
        }
        Some(t) => t.to_string(),
    }
}
