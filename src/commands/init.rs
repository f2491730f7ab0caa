use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use helpdesk::db::Database;

pub const HELPDESK_DIR: &str = ".helpdesk";
pub const DB_FILE: &str = "helpdesk.db";

/// Creates the database. With `db_path` set (`--db` or `HELPDESK_DB`) the
/// database goes there; otherwise into `.helpdesk/` under `path`.
pub fn run(path: &Path, db_path: Option<&Path>) -> Result<()> {
    let default_path = path.join(HELPDESK_DIR).join(DB_FILE);
    let db_path = db_path.unwrap_or(&default_path);

    if db_path.exists() {
        println!("Already initialized at {}", db_path.display());
        return Ok(());
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Database::open(db_path)?;
    println!("Created {}", db_path.display());

    println!("Helpdesk initialized successfully!");
    println!("\nNext steps:");
    println!("  helpdesk user add you@example.com \"Your Name\"   # Register a customer");
    println!("  helpdesk create \"Title\" --user 1                 # Open a ticket");
    println!("  helpdesk serve                                   # Start the HTTP API");

    Ok(())
}
