//! The `wordcraft today` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use wordcraft_core::day::DayKey;
use wordcraft_core::progress::{WordCount, WordState};

use super::score_label;
use crate::session::Session;
use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, count: Option<u8>, day: Option<DayKey>) -> Result<()> {
    let session = Session::open(global)?;
    let day = day.unwrap_or_else(DayKey::today);
    let count = match count {
        Some(n) => WordCount::try_from(n)?,
        None => session.trainer.word_count(),
    };

    let words = session.trainer.daily(&session.bank, &day, count);

    let mut table = Table::new();
    table.set_header(vec!["#", "Word", "Tier", "Phase", "Definition", "Sentence"]);
    for (i, (entry, state)) in words.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&entry.term),
            Cell::new(entry.tier),
            Cell::new(state.phase),
            Cell::new(definition_cell(state)),
            Cell::new(sentence_cell(state)),
        ]);
    }

    let done = words.iter().filter(|(_, s)| s.phase.is_terminal()).count();
    println!("Words for {day} (judge: {})", session.trainer.judge_name());
    println!("{table}");
    println!("{done}/{} complete", words.len());
    Ok(())
}

fn definition_cell(state: &WordState) -> String {
    state
        .definition_feedback
        .as_ref()
        .map(score_label)
        .unwrap_or_else(|| "-".to_string())
}

fn sentence_cell(state: &WordState) -> String {
    state
        .sentence_feedback
        .as_ref()
        .map(score_label)
        .unwrap_or_else(|| "-".to_string())
}
