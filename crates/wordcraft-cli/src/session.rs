//! Shared setup for commands that touch progress.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use wordcraft_core::day::DayKey;
use wordcraft_core::model::{WordBank, WordEntry};
use wordcraft_core::progress::WordCount;
use wordcraft_core::storage::JsonFileBackend;
use wordcraft_core::trainer::Trainer;
use wordcraft_judges::config::{create_judge, load_config_from, WordcraftConfig};

use crate::GlobalArgs;

/// A loaded config, bank and trainer.
pub struct Session {
    pub bank: WordBank,
    pub trainer: Trainer,
    pub data_dir: PathBuf,
}

impl Session {
    pub fn open(args: &GlobalArgs) -> Result<Self> {
        let config = load_config_from(args.config.as_deref())?;
        let bank = load_bank(args, &config)?;

        let judge_name = args
            .judge
            .clone()
            .unwrap_or_else(|| config.default_judge.clone());
        let judge = create_judge(
            &config.judge_config(&judge_name)?,
            config.judge_model.as_deref(),
        )
        .with_context(|| format!("failed to create judge '{judge_name}'"))?;

        let data_dir = args.data_dir.clone().unwrap_or(config.data_dir);
        let backend = Arc::new(JsonFileBackend::new(&data_dir));
        tracing::debug!(data_dir = %data_dir.display(), judge = %judge_name, "session opened");

        Ok(Self {
            bank,
            trainer: Trainer::new(Arc::from(judge), backend),
            data_dir,
        })
    }

    /// Resolve `term` against the day's selection.
    ///
    /// Selections are prefixes of the day's permutation, so matching against
    /// the largest count accepts every word `today --count N` can show.
    pub fn todays_entry(&self, day: &DayKey, term: &str) -> Result<&WordEntry> {
        let selection = self
            .trainer
            .daily(&self.bank, day, WordCount::largest());
        selection
            .into_iter()
            .map(|(entry, _)| entry)
            .find(|entry| entry.term.eq_ignore_ascii_case(term.trim()))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "'{}' is not one of the words for {day}. Run `wordcraft today` to see them.",
                    term.trim()
                )
            })
    }
}

/// The bank named on the command line, in the config, or the built-in one.
pub fn load_bank(args: &GlobalArgs, config: &WordcraftConfig) -> Result<WordBank> {
    match args.bank.as_ref().or(config.bank.as_ref()) {
        Some(path) => WordBank::load(path)
            .with_context(|| format!("failed to load word bank {}", path.display())),
        None => Ok(WordBank::builtin()?),
    }
}
