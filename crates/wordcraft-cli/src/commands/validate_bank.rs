//! The `wordcraft validate-bank` command.

use std::collections::BTreeMap;

use anyhow::Result;

use wordcraft_judges::config::load_config_from;

use crate::session::load_bank;
use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let config = load_config_from(global.config.as_deref())?;
    let source = global
        .bank
        .as_ref()
        .or(config.bank.as_ref())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in bank".to_string());

    let bank = load_bank(global, &config)?;

    let mut tiers = BTreeMap::new();
    for entry in bank.entries() {
        *tiers.entry(entry.tier).or_insert(0usize) += 1;
    }

    println!("Word bank: {source} ({} words)", bank.len());
    for (tier, n) in &tiers {
        println!("  tier {} ({tier}): {n}", u8::from(*tier));
    }

    let missing: Vec<&str> = bank
        .entries()
        .iter()
        .filter(|e| e.connotation_note.trim().is_empty() || e.etymology.trim().is_empty())
        .map(|e| e.term.as_str())
        .collect();
    if missing.is_empty() {
        println!("Word bank valid.");
    } else {
        for term in &missing {
            println!("  [{term}] WARNING: missing connotation or roots");
        }
        println!("\n{} warning(s) found.", missing.len());
    }

    Ok(())
}
