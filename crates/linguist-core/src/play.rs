//! Orchestration of tutor calls against the game record.
//!
//! A [`QuestRun`] drives the tutor and the progression engine for one quest.
//! Every tutor call gets the configured deadline and the run's cancel token;
//! a failed call is logged and leaves the game state untouched. An
//! [`OracleCall`] does the same for a voice conversation with the oracle.
//! Every state change goes through the [`StateStore`].

use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{CoreError, Rejection, Result, ValidationError};
use crate::events::Event;
use crate::game::catalog::LanguageLevel;
use crate::game::completion::{complete_quest, ClearReport};
use crate::game::tracker::grant_oracle_reward;
use crate::game::{AnswerOutcome, BattleSession, Screen};
use crate::storage::{Config, StateStore};
use crate::tutor::voice::{MessageEffects, Persona, ServerMessage};
use crate::tutor::{with_deadline, CancelToken, Lesson, QuestRequest, Tutor, VoiceSession};

/// Result of one submitted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStep {
    pub outcome: AnswerOutcome,
    /// Events from scoring and, on a clear, from completion.
    pub events: Vec<Event>,
    pub screen: Screen,
}

pub struct QuestRun<'a, T: Tutor> {
    tutor: &'a T,
    store: &'a StateStore,
    language: String,
    level: LanguageLevel,
    timeout: Duration,
    cancel: CancelToken,
    screen: Screen,
    lesson: Option<Lesson>,
    battle: Option<BattleSession>,
}

impl<'a, T: Tutor> QuestRun<'a, T> {
    pub fn new(tutor: &'a T, store: &'a StateStore, config: &Config, cancel: CancelToken) -> Self {
        Self {
            tutor,
            store,
            language: config.language_name().to_string(),
            level: config.learner.level,
            timeout: config.tutor.timeout(),
            cancel,
            screen: Screen::Map,
            lesson: None,
            battle: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        self.lesson.as_ref()
    }

    pub fn battle(&self) -> Option<&BattleSession> {
        self.battle.as_ref()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Fetch a quest for `topic` and move to the quest screen.
    ///
    /// # Errors
    ///
    /// [`Rejection::HeartsDepleted`] with no hearts left, or the tutor error.
    /// Either way the run stays where it was.
    pub async fn start_quest(&mut self, topic: &str) -> Result<&Lesson> {
        if self.store.snapshot().hearts == 0 {
            return Err(Rejection::HeartsDepleted.into());
        }
        let request = QuestRequest {
            language: self.language.clone(),
            level: self.level,
            topic: topic.to_string(),
        };
        let lesson = with_deadline(self.tutor.quest(&request), self.timeout, &self.cancel)
            .await
            .inspect_err(|e| warn!(tutor = self.tutor.name(), error = %e, %topic, "quest generation failed"))?;

        info!(title = %lesson.title, %topic, "quest ready");
        self.screen = Screen::Quest;
        self.battle = None;
        Ok(self.lesson.insert(lesson))
    }

    /// Fetch the quiz for the current quest and open the battle.
    pub async fn start_battle(&mut self) -> Result<Event> {
        let Some(lesson) = &self.lesson else {
            return Err(no_quest());
        };
        let questions = with_deadline(
            self.tutor.quiz(&self.language, &lesson.content),
            self.timeout,
            &self.cancel,
        )
        .await
        .inspect_err(|e| warn!(tutor = self.tutor.name(), error = %e, "quiz generation failed"))?;

        let battle = BattleSession::start(&self.store.snapshot(), questions)?;
        let event = Event::BattleStarted {
            questions: battle.len(),
        };
        self.battle = Some(battle);
        self.screen = Screen::Battle;
        Ok(event)
    }

    /// Submit an answer for the current question.
    ///
    /// A clearing answer first requests card art best-effort, then scoring
    /// and completion rewards are committed as one write. If that write
    /// fails the battle stays on the same question.
    pub async fn answer(&mut self, answer: &str, today: NaiveDate) -> Result<RunStep> {
        let (Some(battle), Some(lesson)) = (self.battle.as_ref(), self.lesson.as_ref()) else {
            return Err(no_quest());
        };
        let art = if battle.clears_with(answer) {
            self.fetch_art(lesson).await
        } else {
            None
        };

        let (Some(battle), Some(lesson)) = (self.battle.as_mut(), self.lesson.as_ref()) else {
            return Err(no_quest());
        };
        let mut session = battle.clone();
        let mut outcome = None;
        let committed = self.store.apply(|state| {
            let step = session.answer(state, answer)?;
            let transition = match ClearReport::from_outcome(&step.outcome) {
                Some(report) => step
                    .transition
                    .then(|s| complete_quest(s, lesson, report, today, art)),
                None => step.transition,
            };
            outcome = Some(step.outcome);
            Ok::<_, CoreError>(transition)
        })?;
        let Some(outcome) = outcome else {
            return Err(no_quest());
        };
        *battle = session;
        let events = committed.events;

        let screen = outcome.next_screen();
        if screen == Screen::Map {
            self.lesson = None;
            self.battle = None;
        }
        self.screen = screen;
        Ok(RunStep {
            outcome,
            events,
            screen,
        })
    }

    /// Leave the run: pending tutor calls are cancelled and the battle, if
    /// any, is forfeited without penalty.
    pub fn abandon(&mut self) {
        self.cancel.cancel();
        self.lesson = None;
        self.battle = None;
        self.screen = Screen::Map;
    }

    async fn fetch_art(&self, lesson: &Lesson) -> Option<String> {
        let word = lesson.vocabulary.first()?;
        match with_deadline(
            self.tutor.art(&word.word, &self.language),
            self.timeout,
            &self.cancel,
        )
        .await
        {
            Ok(art) => art,
            Err(e) => {
                warn!(word = %word.word, error = %e, "card art unavailable, storing without image");
                None
            }
        }
    }
}

/// A voice conversation bound to the game record.
///
/// The session decides when access is granted; the call turns that into
/// the oracle reward.
pub struct OracleCall<'a> {
    store: &'a StateStore,
    session: VoiceSession,
    model: String,
}

impl<'a> OracleCall<'a> {
    pub fn new(store: &'a StateStore, config: &Config, persona: Persona) -> Self {
        Self {
            store,
            session: VoiceSession::new(persona, config.language_name(), config.learner.level),
            model: config.tutor.voice_model.clone(),
        }
    }

    pub fn session(&self) -> &VoiceSession {
        &self.session
    }

    /// Lifecycle transitions (`connect`, `opened`, `close`, `closed`).
    pub fn session_mut(&mut self) -> &mut VoiceSession {
        &mut self.session
    }

    /// First frame to send once the socket is open.
    pub fn setup_frame(&self) -> Value {
        self.session.setup_frame(&self.model)
    }

    /// Feed one server message; pays the oracle reward when it grants access.
    pub fn handle(
        &mut self,
        message: &ServerMessage,
        now: f64,
    ) -> Result<(MessageEffects, Vec<Event>)> {
        let effects = self.session.handle(message, now);
        if !effects.access_granted {
            return Ok((effects, Vec::new()));
        }
        let paid = self
            .store
            .apply(|state| Ok::<_, CoreError>(grant_oracle_reward(state)))?;
        info!(gems = self.store.snapshot().gems, "oracle granted access");
        Ok((effects, paid.events))
    }
}

fn no_quest() -> CoreError {
    ValidationError::InvalidValue {
        field: "quest".into(),
        message: "no quest or battle in progress".into(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TutorError;
    use crate::game::VocabularyItem;
    use crate::tutor::{Feedback, QuizQuestion};

    struct ScriptedTutor {
        questions: usize,
        art: Option<String>,
        fail_art: bool,
        fail_quest: bool,
    }

    impl Default for ScriptedTutor {
        fn default() -> Self {
            Self {
                questions: 2,
                art: Some("data:image/png;base64,AAAA".into()),
                fail_art: false,
                fail_quest: false,
            }
        }
    }

    impl Tutor for ScriptedTutor {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn quest(&self, request: &QuestRequest) -> std::result::Result<Lesson, TutorError> {
            if self.fail_quest {
                return Err(TutorError::Status {
                    model: "scripted".into(),
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(Lesson {
                id: "q1".into(),
                title: format!("{} quest", request.topic),
                narrative: String::new(),
                content: "El magma sube.".into(),
                vocabulary: vec![VocabularyItem {
                    word: "magma".into(),
                    translation: "magma".into(),
                    pronunciation: None,
                    image_url: None,
                    mastery: 0,
                }],
                examples: Vec::new(),
                quest_type: Default::default(),
                difficulty: 1,
                scientific_category: Default::default(),
                educational_fact: None,
            })
        }

        async fn quiz(
            &self,
            _language: &str,
            _lesson_text: &str,
        ) -> std::result::Result<Vec<QuizQuestion>, TutorError> {
            Ok((0..self.questions)
                .map(|i| QuizQuestion {
                    question: format!("q{i}"),
                    options: vec!["yes".into(), "no".into()],
                    correct_answer: "yes".into(),
                    explanation: String::new(),
                })
                .collect())
        }

        async fn art(
            &self,
            _word: &str,
            _language: &str,
        ) -> std::result::Result<Option<String>, TutorError> {
            if self.fail_art {
                return Err(TutorError::Timeout { secs: 1 });
            }
            Ok(self.art.clone())
        }

        async fn feedback(
            &self,
            _language: &str,
            _text: &str,
        ) -> std::result::Result<Feedback, TutorError> {
            Err(TutorError::Cancelled)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    fn store(dir: &tempfile::TempDir) -> StateStore {
        let store = StateStore::open_at(dir.path().join("game_state.json"));
        store
            .replace(crate::game::GameState::new(today()))
            .unwrap();
        store
    }

    #[tokio::test]
    async fn full_run_commits_completion() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let tutor = ScriptedTutor::default();
        let mut run = QuestRun::new(&tutor, &store, &Config::default(), CancelToken::new());

        run.start_quest("Volcanoes").await.unwrap();
        assert_eq!(run.screen(), Screen::Quest);
        run.start_battle().await.unwrap();
        assert_eq!(run.screen(), Screen::Battle);

        let first = run.answer("yes", today()).await.unwrap();
        assert_eq!(first.screen, Screen::Battle);
        let last = run.answer("yes", today()).await.unwrap();
        assert_eq!(last.screen, Screen::Map);
        assert!(matches!(last.outcome, AnswerOutcome::Cleared { combo_before: 1, .. }));
        assert!(last
            .events
            .iter()
            .any(|e| matches!(e, Event::ItemCollected { has_art: true, .. })));

        let state = store.snapshot();
        // 25 + 3 quest gems, 20 + 30 + 50 goal rewards
        assert_eq!(state.gems, 100 + 28 + 100);
        assert_eq!(state.inventory.len(), 1);
        assert!(state.inventory[0].image_url.is_some());
        assert!(run.lesson().is_none());
    }

    #[tokio::test]
    async fn art_failure_does_not_block_completion() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let tutor = ScriptedTutor {
            questions: 1,
            fail_art: true,
            ..ScriptedTutor::default()
        };
        let mut run = QuestRun::new(&tutor, &store, &Config::default(), CancelToken::new());
        run.start_quest("Stars").await.unwrap();
        run.start_battle().await.unwrap();
        run.answer("yes", today()).await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.inventory.len(), 1);
        assert!(state.inventory[0].image_url.is_none());
    }

    #[tokio::test]
    async fn quest_failure_leaves_state_and_screen() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let before = store.snapshot();
        let tutor = ScriptedTutor {
            fail_quest: true,
            ..ScriptedTutor::default()
        };
        let mut run = QuestRun::new(&tutor, &store, &Config::default(), CancelToken::new());

        let err = run.start_quest("Volcanoes").await.unwrap_err();
        assert!(matches!(err, CoreError::Tutor(TutorError::Status { status: 500, .. })));
        assert_eq!(run.screen(), Screen::Map);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn no_hearts_no_quest() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let mut broke = store.snapshot();
        broke.hearts = 0;
        store.replace(broke).unwrap();
        let tutor = ScriptedTutor::default();
        let mut run = QuestRun::new(&tutor, &store, &Config::default(), CancelToken::new());

        let err = run.start_quest("Volcanoes").await.unwrap_err();
        assert!(matches!(err, CoreError::Rejected(Rejection::HeartsDepleted)));
    }

    #[tokio::test]
    async fn cancelled_run_refuses_tutor_calls() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let tutor = ScriptedTutor::default();
        let mut run = QuestRun::new(&tutor, &store, &Config::default(), CancelToken::new());
        run.start_quest("Volcanoes").await.unwrap();
        run.abandon();

        assert_eq!(run.screen(), Screen::Map);
        let err = run.start_quest("Volcanoes").await.unwrap_err();
        assert!(matches!(err, CoreError::Tutor(TutorError::Cancelled)));
    }

    #[tokio::test]
    async fn wrong_answers_cost_hearts_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let tutor = ScriptedTutor::default();
        let mut run = QuestRun::new(&tutor, &store, &Config::default(), CancelToken::new());
        run.start_quest("Volcanoes").await.unwrap();
        run.start_battle().await.unwrap();

        let step = run.answer("no", today()).await.unwrap();
        assert!(matches!(step.outcome, AnswerOutcome::Missed { hearts_left: 4, .. }));
        let step = run.answer("no", today()).await.unwrap();
        assert_eq!(step.outcome, AnswerOutcome::Failed);
        assert_eq!(step.screen, Screen::Map);
        assert_eq!(store.snapshot().hearts, 3);
        assert_eq!(StateStore::open_at(store.path()).snapshot().hearts, 3);
    }

    #[tokio::test]
    async fn failed_clear_write_keeps_battle_open() {
        let dir = tempfile::tempdir().unwrap();
        let save_dir = dir.path().join("save");
        std::fs::create_dir(&save_dir).unwrap();
        let store = StateStore::open_at(save_dir.join("game_state.json"));
        store
            .replace(crate::game::GameState::new(today()))
            .unwrap();
        let tutor = ScriptedTutor {
            questions: 1,
            ..ScriptedTutor::default()
        };
        let mut run = QuestRun::new(&tutor, &store, &Config::default(), CancelToken::new());
        run.start_quest("Volcanoes").await.unwrap();
        run.start_battle().await.unwrap();

        std::fs::remove_dir_all(&save_dir).unwrap();
        assert!(matches!(
            run.answer("yes", today()).await,
            Err(CoreError::StoreWrite { .. })
        ));
        assert_eq!(run.screen(), Screen::Battle);
        assert!(run.battle().and_then(|b| b.current()).is_some());
        assert!(store.snapshot().inventory.is_empty());

        std::fs::create_dir(&save_dir).unwrap();
        let step = run.answer("yes", today()).await.unwrap();
        assert!(matches!(step.outcome, AnswerOutcome::Cleared { .. }));
        assert_eq!(StateStore::open_at(store.path()).snapshot().inventory.len(), 1);
    }

    #[test]
    fn oracle_pays_once_per_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let mut config = Config::default();
        config.set("tutor.voice_model", "oracle-live").unwrap();
        let mut call = OracleCall::new(&store, &config, Persona::Oracle);
        assert_eq!(call.setup_frame()["setup"]["model"], "models/oracle-live");

        call.session_mut().connect().unwrap();
        call.session_mut().opened().unwrap();
        let granted: ServerMessage = serde_json::from_value(serde_json::json!({
            "serverContent": { "outputTranscription": { "text": "ACCESS GRANTED" } }
        }))
        .unwrap();

        let (effects, events) = call.handle(&granted, 0.0).unwrap();
        assert!(effects.access_granted);
        assert_eq!(events.len(), 1);
        let (_, events) = call.handle(&granted, 0.0).unwrap();
        assert!(events.is_empty());
        assert_eq!(store.snapshot().gems, 200);
    }

    #[tokio::test]
    async fn answering_without_battle_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let tutor = ScriptedTutor::default();
        let mut run = QuestRun::new(&tutor, &store, &Config::default(), CancelToken::new());
        assert!(matches!(
            run.answer("yes", today()).await,
            Err(CoreError::Validation(_))
        ));
    }
}
