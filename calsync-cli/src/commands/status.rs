use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::GlobalConfig;
use crate::store::SqliteStore;

pub fn run() -> Result<()> {
    let config = GlobalConfig::load()?;
    let store = SqliteStore::open(&config.database_path())?;

    println!("Calendar: {}", config.calendar_id.bold());
    println!("Database: {}", config.database_path().display());
    println!(
        "{} synced events across {} event types",
        store.event_count()?,
        store.event_type_count()?
    );

    Ok(())
}
