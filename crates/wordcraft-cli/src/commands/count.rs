//! The `wordcraft count` command.

use anyhow::Result;

use wordcraft_core::progress::WordCount;

use crate::session::Session;
use crate::GlobalArgs;

pub fn execute(global: &GlobalArgs, value: Option<u8>) -> Result<()> {
    let session = Session::open(global)?;

    match value {
        Some(n) => {
            let count = WordCount::try_from(n)?;
            session.trainer.set_word_count(count)?;
            println!(
                "Words per day set to {} (saved in {}).",
                count.get(),
                session.data_dir.display()
            );
        }
        None => println!("Words per day: {}", session.trainer.word_count().get()),
    }
    Ok(())
}
