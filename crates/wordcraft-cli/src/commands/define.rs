//! The `wordcraft define` command.

use anyhow::Result;

use wordcraft_core::day::DayKey;
use wordcraft_core::phase::{DefinitionIntent, Phase};

use super::{next_step, print_entry, print_feedback};
use crate::session::Session;
use crate::GlobalArgs;

pub async fn execute(
    global: &GlobalArgs,
    term: &str,
    text: &str,
    known: bool,
    day: Option<DayKey>,
) -> Result<()> {
    let session = Session::open(global)?;
    let day = day.unwrap_or_else(DayKey::today);
    let entry = session.todays_entry(&day, term)?;

    let intent = if known {
        DefinitionIntent::AlreadyKnown
    } else {
        DefinitionIntent::Learn
    };
    let state = session
        .trainer
        .submit_definition(&day, entry, text, intent)
        .await?;

    if let Some(feedback) = &state.definition_feedback {
        print_feedback("Definition", feedback);
        if feedback.is_unassessed() {
            println!("\nYou can resubmit: wordcraft define {} \"<your definition>\"", entry.term);
        }
    }
    println!();

    if state.phase == Phase::Dismissed {
        println!("Marked '{}' as known. Nice work.", entry.term);
        return Ok(());
    }
    if known {
        println!("Not quite enough to skip this one. Here is the full entry:");
    }
    print_entry(entry);
    if let Some(step) = next_step(&entry.term, state.phase) {
        println!("\nNext: {step}");
    }
    Ok(())
}
