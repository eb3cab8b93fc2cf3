//! Analysis history commands

use anyhow::{bail, Result};
use serde_json::Value;
use tracing::warn;

use envirogeo_core::{
    models::AnalysisRecord, store::ANALYSIS_HISTORY, DocumentStore, StoreClient,
};

/// Load a user's saved analyses, newest first, skipping malformed entries
pub fn load_history(store: &StoreClient, user: &str) -> Result<Vec<AnalysisRecord>> {
    let docs = store.get_analysis_history(ANALYSIS_HISTORY, user)?;

    Ok(docs
        .into_iter()
        .filter_map(|doc| {
            let id = doc.get("_id").and_then(Value::as_str).unwrap_or("?").to_string();
            match serde_json::from_value::<AnalysisRecord>(Value::Object(doc)) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(id = %id, error = %e, "Skipping malformed history entry");
                    None
                }
            }
        })
        .collect())
}

pub fn cmd_history_list(store: &StoreClient, user: &str) -> Result<()> {
    let history = load_history(store, user)?;

    if history.is_empty() {
        println!("No saved analyses for {}. Save one with:", user);
        println!("  envirogeo analyze --parameter NDVI --lat 31.5 --lon 74.3 --from 2023-01-01 --to 2023-12-31 --save-as {}", user);
        return Ok(());
    }

    println!();
    println!("🗂️  Analysis history for {}", user);
    println!("   ─────────────────────────────");

    for record in history {
        println!(
            "   {}  {:<14} {} to {}  {} ({}%)  saved {}",
            record.id,
            record.parameter.as_str(),
            record.start_date,
            record.end_date,
            record.results.stats.trend,
            record.results.stats.trend_percent,
            record.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub fn cmd_history_delete(store: &StoreClient, user: &str, id: &str) -> Result<()> {
    let deleted = store.delete_analysis(ANALYSIS_HISTORY, user, id)?;
    if deleted == 0 {
        bail!("No analysis {} found for {}", id, user);
    }

    println!("🗑️  Deleted analysis {}", id);
    Ok(())
}
