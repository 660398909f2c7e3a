//! The `wordcraft known` command.

use anyhow::Result;

use wordcraft_core::day::DayKey;

use crate::session::Session;
use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, term: &str, day: Option<DayKey>) -> Result<()> {
    let session = Session::open(global)?;
    let day = day.unwrap_or_else(DayKey::today);
    let entry = session.todays_entry(&day, term)?;

    session.trainer.mark_known(&day, &entry.term)?;
    println!("Marked '{}' as known.", entry.term);
    Ok(())
}
