use anyhow::{Context, Result};
use calsync_core::{SyncError, Syncer};
use owo_colors::OwoColorize;

use super::create_spinner;
use crate::auth::{Credentials, Tokens};
use crate::config::GlobalConfig;
use crate::google::GoogleClient;
use crate::rrule::RuleParser;
use crate::store::SqliteStore;

pub async fn run() -> Result<()> {
    let config = GlobalConfig::load()?;
    let creds = Credentials::load()?;
    let tokens = Tokens::load()?;

    let store = SqliteStore::open(&config.database_path())?;
    let client = GoogleClient::new(creds, tokens);
    let parser = RuleParser;

    let mut syncer = Syncer::new(
        &client,
        &store,
        &parser,
        &config.calendar_id,
        config.default_color,
    );

    let spinner = create_spinner(format!("Syncing {}", config.calendar_id));
    let result = syncer.run().await;
    spinner.finish_and_clear();

    match result {
        Ok(stats) => {
            println!(
                "Synced {}: {} fetched across {} pages, {} committed, {} skipped",
                config.calendar_id.green(),
                stats.fetched,
                stats.pages,
                stats.committed,
                stats.skipped
            );
            Ok(())
        }
        Err(SyncError::AuthRequired { recovery }) => {
            println!(
                "{}",
                "Authorization expired; reconnect to continue.".yellow()
            );
            println!("\nOpen this URL to reauthorize, then run `calsync connect`:\n");
            println!("{}\n", recovery);

            if open::that(&recovery).is_err() {
                println!("(Could not open browser automatically, please copy the URL above)");
            }
            Ok(())
        }
        Err(e) => Err(e).context("Sync failed"),
    }
}
