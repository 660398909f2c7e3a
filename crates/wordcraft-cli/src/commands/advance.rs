//! The `wordcraft advance` command.

use anyhow::Result;

use wordcraft_core::day::DayKey;

use super::next_step;
use crate::session::Session;
use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, term: &str, day: Option<DayKey>) -> Result<()> {
    let session = Session::open(global)?;
    let day = day.unwrap_or_else(DayKey::today);
    let entry = session.todays_entry(&day, term)?;

    let state = session.trainer.advance_to_sentence(&day, &entry.term)?;
    println!("'{}' is ready for sentence practice.", entry.term);
    if let Some(step) = next_step(&entry.term, state.phase) {
        println!("Next: {step}");
    }
    Ok(())
}
