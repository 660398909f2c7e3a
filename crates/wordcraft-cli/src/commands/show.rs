//! The `wordcraft show` command.

use anyhow::Result;

use wordcraft_core::day::DayKey;
use wordcraft_core::phase::Phase;

use super::{next_step, print_entry, print_feedback};
use crate::session::Session;
use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, term: &str, day: Option<DayKey>) -> Result<()> {
    let session = Session::open(global)?;
    let day = day.unwrap_or_else(DayKey::today);
    let entry = session.todays_entry(&day, term)?;
    let state = session.trainer.state(&day, &entry.term);

    println!("Phase: {}", state.phase);
    // the reference entry stays hidden until a definition has been attempted
    if state.phase == Phase::Defining {
        println!("{} ({})", entry.term, entry.tier);
    } else {
        print_entry(entry);
    }

    if let (Some(text), Some(feedback)) = (&state.user_definition, &state.definition_feedback) {
        println!("\nYour definition: {text}");
        print_feedback("Definition", feedback);
    }
    if let (Some(text), Some(feedback)) = (&state.user_sentence, &state.sentence_feedback) {
        println!("\nYour sentence: {text}");
        print_feedback("Sentence", feedback);
    }
    if let Some(step) = next_step(&entry.term, state.phase) {
        println!("\nNext: {step}");
    }
    Ok(())
}
