//! The `wordcraft sentence` command.

use anyhow::Result;

use wordcraft_core::day::DayKey;

use super::print_feedback;
use crate::session::Session;
use crate::GlobalArgs;

pub async fn execute(
    global: &GlobalArgs,
    term: &str,
    text: &str,
    day: Option<DayKey>,
) -> Result<()> {
    let session = Session::open(global)?;
    let day = day.unwrap_or_else(DayKey::today);
    let entry = session.todays_entry(&day, term)?;

    let state = session.trainer.submit_sentence(&day, entry, text).await?;
    if let Some(feedback) = &state.sentence_feedback {
        print_feedback("Sentence", feedback);
        if feedback.is_unassessed() {
            println!("\nYou can resubmit: wordcraft sentence {} \"<your sentence>\"", entry.term);
        }
    }
    Ok(())
}
