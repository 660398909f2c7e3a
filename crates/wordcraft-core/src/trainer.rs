//! Trainer: drives words through their phase machines.
//!
//! The trainer owns the in-memory progress store, the persistence backend and
//! the judge. Every transition is saved before it is reported back, and at
//! most one assessment per word is in flight at a time.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::instrument;

use crate::assessment::{validate_user_input, Feedback};
use crate::day::DayKey;
use crate::error::TrainerError;
use crate::model::{WordBank, WordEntry};
use crate::phase::DefinitionIntent;
use crate::progress::{ProgressStore, WordCount, WordState};
use crate::selector::select_daily;
use crate::storage::ProgressBackend;
use crate::traits::{AssessmentRequest, Judge};

type PendingKey = (DayKey, String);

/// The session-level orchestrator.
pub struct Trainer {
    judge: Arc<dyn Judge>,
    backend: Arc<dyn ProgressBackend>,
    store: Mutex<ProgressStore>,
    pending: Mutex<HashSet<PendingKey>>,
}

impl Trainer {
    /// Create a trainer, rehydrating progress from `backend`.
    pub fn new(judge: Arc<dyn Judge>, backend: Arc<dyn ProgressBackend>) -> Self {
        let store = backend.load();
        Self {
            judge,
            backend,
            store: Mutex::new(store),
            pending: Mutex::new(HashSet::new()),
        }
    }

    pub fn judge_name(&self) -> &str {
        self.judge.name()
    }

    /// Snapshot of the whole store.
    pub fn store(&self) -> ProgressStore {
        lock(&self.store).clone()
    }

    pub fn state(&self, day: &DayKey, term: &str) -> WordState {
        lock(&self.store).get_state_for(day, term)
    }

    pub fn word_count(&self) -> WordCount {
        self.backend.load_word_count()
    }

    pub fn set_word_count(&self, count: WordCount) -> Result<(), TrainerError> {
        self.backend.save_word_count(count)?;
        Ok(())
    }

    /// The day's words paired with their current state.
    pub fn daily<'a>(
        &self,
        bank: &'a WordBank,
        day: &DayKey,
        count: WordCount,
    ) -> Vec<(&'a WordEntry, WordState)> {
        let store = lock(&self.store);
        select_daily(bank, day, count.get())
            .into_iter()
            .map(|entry| (entry, store.get_state_for(day, &entry.term)))
            .collect()
    }

    /// Submit a definition and record the judge's feedback.
    #[instrument(skip(self, entry, text), fields(term = %entry.term, judge = self.judge.name()))]
    pub async fn submit_definition(
        &self,
        day: &DayKey,
        entry: &WordEntry,
        text: &str,
        intent: DefinitionIntent,
    ) -> Result<WordState, TrainerError> {
        let text = validate_user_input(text)?;
        self.state(day, &entry.term).check_submit_definition()?;

        let _guard = PendingGuard::acquire(&self.pending, day, &entry.term)?;
        let feedback = self
            .assess(&AssessmentRequest::definition(entry, text))
            .await;

        let mut state = self.state(day, &entry.term);
        state.apply_definition(text, feedback, intent)?;
        self.commit(day, &entry.term, &state)?;
        tracing::info!(phase = %state.phase, "definition recorded");
        Ok(state)
    }

    /// Submit an example sentence and record the judge's feedback.
    #[instrument(skip(self, entry, text), fields(term = %entry.term, judge = self.judge.name()))]
    pub async fn submit_sentence(
        &self,
        day: &DayKey,
        entry: &WordEntry,
        text: &str,
    ) -> Result<WordState, TrainerError> {
        let text = validate_user_input(text)?;
        self.state(day, &entry.term).check_submit_sentence()?;

        let _guard = PendingGuard::acquire(&self.pending, day, &entry.term)?;
        let feedback = self.assess(&AssessmentRequest::sentence(entry, text)).await;

        let mut state = self.state(day, &entry.term);
        state.apply_sentence(text, feedback)?;
        self.commit(day, &entry.term, &state)?;
        tracing::info!(phase = %state.phase, "sentence recorded");
        Ok(state)
    }

    #[instrument(skip(self))]
    pub fn advance_to_sentence(&self, day: &DayKey, term: &str) -> Result<WordState, TrainerError> {
        let mut state = self.state(day, term);
        state.advance_to_sentence()?;
        self.commit(day, term, &state)?;
        Ok(state)
    }

    #[instrument(skip(self))]
    pub fn mark_known(&self, day: &DayKey, term: &str) -> Result<WordState, TrainerError> {
        let mut state = self.state(day, term);
        state.mark_known()?;
        self.commit(day, term, &state)?;
        Ok(state)
    }

    /// Call the judge once. Any failure becomes the unassessed sentinel.
    async fn assess(&self, request: &AssessmentRequest) -> Feedback {
        match self.judge.assess(request).await {
            Ok(raw) => Feedback::from_raw(request.mode, &raw).unwrap_or_else(|e| {
                tracing::warn!(mode = %request.mode, error = %e, "malformed assessment");
                Feedback::unassessed()
            }),
            Err(e) => {
                tracing::warn!(mode = %request.mode, error = %format!("{e:#}"), "assessment failed");
                Feedback::unassessed()
            }
        }
    }

    /// Replace one entry and save the whole store. Memory is only updated once
    /// the save succeeded.
    fn commit(&self, day: &DayKey, term: &str, state: &WordState) -> Result<(), TrainerError> {
        let mut store = lock(&self.store);
        let next = store.clone().put_state_for(day, term, state.clone());
        self.backend.save(&next)?;
        *store = next;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Marks a word as having an assessment in flight until dropped.
struct PendingGuard<'a> {
    pending: &'a Mutex<HashSet<PendingKey>>,
    key: PendingKey,
}

impl<'a> PendingGuard<'a> {
    fn acquire(
        pending: &'a Mutex<HashSet<PendingKey>>,
        day: &DayKey,
        term: &str,
    ) -> Result<Self, TrainerError> {
        let key = (day.clone(), term.to_string());
        if !lock(pending).insert(key.clone()) {
            return Err(TrainerError::Pending {
                term: term.to_string(),
            });
        }
        Ok(Self { pending, key })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        lock(self.pending).remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;

    use crate::assessment::FALLBACK_MESSAGE;
    use crate::model::Tier;
    use crate::phase::Phase;
    use crate::storage::MemoryBackend;
    use crate::traits::{AssessmentMode, RawAssessment};

    /// Replies with a fixed score; sentence replies carry an improved sample.
    struct ScoreJudge {
        score: serde_json::Value,
        calls: AtomicU32,
    }

    impl ScoreJudge {
        fn new(score: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                score,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl Judge for ScoreJudge {
        fn name(&self) -> &str {
            "score"
        }

        async fn assess(&self, request: &AssessmentRequest) -> anyhow::Result<RawAssessment> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(RawAssessment {
                score: self.score.clone(),
                feedback: format!("{} noted", request.mode),
                improved: (request.mode == AssessmentMode::Sentence)
                    .then(|| "A sharper sentence.".to_string()),
            })
        }
    }

    struct FailingJudge;

    #[async_trait]
    impl Judge for FailingJudge {
        fn name(&self) -> &str {
            "failing"
        }

        async fn assess(&self, _: &AssessmentRequest) -> anyhow::Result<RawAssessment> {
            anyhow::bail!("connection refused")
        }
    }

    /// Blocks until released, to hold an assessment in flight.
    struct GateJudge {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl Judge for GateJudge {
        fn name(&self) -> &str {
            "gate"
        }

        async fn assess(&self, _: &AssessmentRequest) -> anyhow::Result<RawAssessment> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(RawAssessment {
                score: json!(3),
                feedback: "ok".into(),
                improved: None,
            })
        }
    }

    fn entry() -> WordEntry {
        WordEntry {
            term: "laconic".into(),
            definition: "using very few words".into(),
            connotation_note: "dry".into(),
            etymology: "Greek".into(),
            tier: Tier::Advanced,
        }
    }

    fn day() -> DayKey {
        "2024-03-01".parse().unwrap()
    }

    #[tokio::test]
    async fn every_transition_is_saved() {
        let backend = Arc::new(MemoryBackend::new());
        let trainer = Trainer::new(ScoreJudge::new(json!(3)), backend.clone());
        let e = entry();

        trainer
            .submit_definition(&day(), &e, "brief", DefinitionIntent::Learn)
            .await
            .unwrap();
        assert_eq!(backend.save_count(), 1);

        trainer.advance_to_sentence(&day(), &e.term).unwrap();
        assert_eq!(backend.save_count(), 2);

        let state = trainer
            .submit_sentence(&day(), &e, "Her laconic note said enough.")
            .await
            .unwrap();
        assert_eq!(backend.save_count(), 3);
        assert_eq!(state.phase, Phase::Graded);

        let reloaded = Trainer::new(ScoreJudge::new(json!(3)), backend.clone());
        assert_eq!(reloaded.state(&day(), &e.term), state);
        assert_eq!(reloaded.store(), trainer.store());
    }

    #[tokio::test]
    async fn already_known_with_high_score_dismisses() {
        let trainer = Trainer::new(ScoreJudge::new(json!(4)), Arc::new(MemoryBackend::new()));
        let state = trainer
            .submit_definition(&day(), &entry(), "brief", DefinitionIntent::AlreadyKnown)
            .await
            .unwrap();
        assert_eq!(state.phase, Phase::Dismissed);
    }

    #[tokio::test]
    async fn already_known_with_low_score_reveals() {
        let trainer = Trainer::new(ScoreJudge::new(json!(3)), Arc::new(MemoryBackend::new()));
        let state = trainer
            .submit_definition(&day(), &entry(), "happy", DefinitionIntent::AlreadyKnown)
            .await
            .unwrap();
        assert_eq!(state.phase, Phase::Revealed);
    }

    #[tokio::test]
    async fn judge_score_is_clamped() {
        let trainer = Trainer::new(ScoreJudge::new(json!(11)), Arc::new(MemoryBackend::new()));
        let state = trainer
            .submit_definition(&day(), &entry(), "brief", DefinitionIntent::Learn)
            .await
            .unwrap();
        assert_eq!(state.definition_feedback.unwrap().score.value(), 5);
    }

    #[tokio::test]
    async fn failed_judge_still_advances_with_sentinel() {
        let trainer = Trainer::new(Arc::new(FailingJudge), Arc::new(MemoryBackend::new()));
        let e = entry();
        let state = trainer
            .submit_definition(&day(), &e, "brief", DefinitionIntent::AlreadyKnown)
            .await
            .unwrap();
        assert_eq!(state.phase, Phase::Revealed);
        let fb = state.definition_feedback.unwrap();
        assert_eq!(fb.score.value(), 0);
        assert_eq!(fb.message, FALLBACK_MESSAGE);

        trainer.advance_to_sentence(&day(), &e.term).unwrap();
        let state = trainer
            .submit_sentence(&day(), &e, "A laconic sentence.")
            .await
            .unwrap();
        assert_eq!(state.phase, Phase::Graded);
        assert_eq!(state.sentence_feedback.unwrap().score.value(), 0);
    }

    #[tokio::test]
    async fn malformed_score_is_a_failure() {
        let trainer = Trainer::new(
            ScoreJudge::new(json!("excellent")),
            Arc::new(MemoryBackend::new()),
        );
        let state = trainer
            .submit_definition(&day(), &entry(), "brief", DefinitionIntent::AlreadyKnown)
            .await
            .unwrap();
        assert_eq!(state.phase, Phase::Revealed);
        assert!(state.definition_feedback.unwrap().is_unassessed());
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_judge() {
        let judge = ScoreJudge::new(json!(5));
        let backend = Arc::new(MemoryBackend::new());
        let trainer = Trainer::new(judge.clone(), backend.clone());

        let err = trainer
            .submit_definition(&day(), &entry(), "   ", DefinitionIntent::Learn)
            .await
            .unwrap_err();
        assert!(matches!(err, TrainerError::Input(_)));

        let long = "x".repeat(1001);
        assert!(trainer
            .submit_definition(&day(), &entry(), &long, DefinitionIntent::Learn)
            .await
            .is_err());

        assert_eq!(judge.calls.load(Ordering::Relaxed), 0);
        assert_eq!(backend.save_count(), 0);
    }

    #[tokio::test]
    async fn wrong_phase_never_reaches_the_judge() {
        let judge = ScoreJudge::new(json!(5));
        let trainer = Trainer::new(judge.clone(), Arc::new(MemoryBackend::new()));

        let err = trainer
            .submit_sentence(&day(), &entry(), "Too early.")
            .await
            .unwrap_err();
        assert!(matches!(err, TrainerError::Transition(_)));
        assert_eq!(judge.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn second_submission_while_pending_is_rejected() {
        let judge = Arc::new(GateJudge {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let trainer = Arc::new(Trainer::new(judge.clone(), Arc::new(MemoryBackend::new())));

        let first = {
            let trainer = trainer.clone();
            tokio::spawn(async move {
                trainer
                    .submit_definition(&day(), &entry(), "brief", DefinitionIntent::Learn)
                    .await
            })
        };
        judge.entered.notified().await;

        let err = trainer
            .submit_definition(&day(), &entry(), "again", DefinitionIntent::Learn)
            .await
            .unwrap_err();
        assert!(matches!(err, TrainerError::Pending { ref term } if term == "laconic"));

        judge.release.notify_one();
        let state = first.await.unwrap().unwrap();
        assert_eq!(state.phase, Phase::Revealed);
        assert!(lock(&trainer.pending).is_empty());
    }

    #[tokio::test]
    async fn daily_rehydrates_states() {
        let bank = WordBank::builtin().unwrap();
        let backend = Arc::new(MemoryBackend::new());
        let trainer = Trainer::new(ScoreJudge::new(json!(2)), backend.clone());
        let count = WordCount::try_from(5).unwrap();

        let words = trainer.daily(&bank, &day(), count);
        assert_eq!(words.len(), 5);
        assert!(words.iter().all(|(_, s)| s.phase == Phase::Defining));

        let (first, _) = words[0];
        trainer
            .submit_definition(&day(), first, "too much talk", DefinitionIntent::Learn)
            .await
            .unwrap();

        let reloaded = Trainer::new(ScoreJudge::new(json!(2)), backend);
        let words = reloaded.daily(&bank, &day(), count);
        assert_eq!(words[0].0.term, first.term);
        assert_eq!(words[0].1.phase, Phase::Revealed);
        assert_eq!(words[1].1.phase, Phase::Defining);
    }

    #[tokio::test]
    async fn corrupt_store_starts_empty() {
        let backend = Arc::new(MemoryBackend::with_raw_progress("garbage"));
        let trainer = Trainer::new(ScoreJudge::new(json!(3)), backend);
        assert!(trainer.store().is_empty());
    }

    #[test]
    fn word_count_preference() {
        let trainer = Trainer::new(ScoreJudge::new(json!(3)), Arc::new(MemoryBackend::new()));
        assert_eq!(trainer.word_count().get(), 3);
        trainer
            .set_word_count(WordCount::try_from(4).unwrap())
            .unwrap();
        assert_eq!(trainer.word_count().get(), 4);
    }
}
