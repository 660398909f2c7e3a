pub mod advance;
pub mod count;
pub mod define;
pub mod init;
pub mod known;
pub mod sentence;
pub mod show;
pub mod today;
pub mod validate_bank;

use wordcraft_core::assessment::Feedback;
use wordcraft_core::model::WordEntry;
use wordcraft_core::phase::Phase;

/// "4/5", or "not scored" for the unassessed sentinel.
pub fn score_label(feedback: &Feedback) -> String {
    if feedback.is_unassessed() {
        "not scored".to_string()
    } else {
        format!("{}/5", feedback.score.value())
    }
}

pub fn print_feedback(label: &str, feedback: &Feedback) {
    println!("{label} score: {}", score_label(feedback));
    println!("  {}", feedback.message);
    if let Some(improved) = &feedback.improved {
        println!("  Try: {improved}");
    }
}

pub fn print_entry(entry: &WordEntry) {
    println!("{} ({})", entry.term, entry.tier);
    println!("  Definition:  {}", entry.definition);
    if !entry.connotation_note.is_empty() {
        println!("  Connotation: {}", entry.connotation_note);
    }
    if !entry.etymology.is_empty() {
        println!("  Roots:       {}", entry.etymology);
    }
}

/// What the user can do next from `phase`.
pub fn next_step(term: &str, phase: Phase) -> Option<String> {
    match phase {
        Phase::Defining => Some(format!("wordcraft define {term} \"<your definition>\"")),
        Phase::Revealed => Some(format!(
            "wordcraft advance {term}   (or: wordcraft known {term})"
        )),
        Phase::ComposingSentence => Some(format!("wordcraft sentence {term} \"<your sentence>\"")),
        Phase::Graded | Phase::Dismissed => None,
    }
}
