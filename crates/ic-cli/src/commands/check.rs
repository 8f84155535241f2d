use std::path::Path;

use colored::Colorize;

pub fn run(dir: &Path) -> Result<(), String> {
    let repo = super::load_repo(dir)?;
    let summary = repo.summary();

    println!("  {} content at '{}'", "Checked".bold(), dir.display());
    for (kind, count) in &summary.counts {
        println!("  {:<18} {count}", kind.to_string());
    }
    println!();
    println!("  {}", "OK".green());

    Ok(())
}
