//! Boss battle scoring.
//!
//! A battle walks through the quiz once. Every submission is final: right
//! or wrong, the next submission is for the next question.
//!
//! ```text
//! correct  -> combo + 1 -> next question | Cleared (last question)
//! wrong    -> combo = 0 -> shield absorbs | heart lost -> Defeated (no hearts)
//!                                                       | Failed (last question)
//!                                                       | next question
//! ```

use serde::Serialize;
use tracing::debug;

use super::catalog::{BASE_ANSWER_XP, COMBO_XP_BONUS, SHIELD};
use super::state::GameState;
use super::{Screen, Transition};
use crate::error::{CoreError, Rejection, ValidationError};
use crate::events::Event;
use crate::tutor::QuizQuestion;

/// What one submission did to the battle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// Correct, more questions remain.
    Advanced { next_index: usize },
    /// Final question answered correctly. Run quest completion next.
    Cleared {
        /// Combo count before this answer; drives the reward bonus.
        combo_before: u32,
        xp: u32,
        flawless: bool,
    },
    /// Wrong, a heart was lost, more questions remain.
    Missed { hearts_left: u32, next_index: usize },
    /// Wrong, an active shield took the hit.
    Shielded { next_index: usize },
    /// Hearts ran out.
    Defeated,
    /// Final question answered wrong with hearts to spare.
    Failed,
}

impl AnswerOutcome {
    pub fn next_screen(&self) -> Screen {
        match self {
            AnswerOutcome::Advanced { .. }
            | AnswerOutcome::Missed { .. }
            | AnswerOutcome::Shielded { .. } => Screen::Battle,
            AnswerOutcome::Cleared { .. } | AnswerOutcome::Defeated | AnswerOutcome::Failed => {
                Screen::Map
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattleStep {
    pub transition: Transition,
    pub outcome: AnswerOutcome,
}

/// In-memory battle progress. Not persisted: leaving the battle abandons it.
#[derive(Debug, Clone)]
pub struct BattleSession {
    questions: Vec<QuizQuestion>,
    index: usize,
    combo: u32,
    misses: u32,
    finished: bool,
}

impl BattleSession {
    /// Open a battle. Needs at least one heart and one question.
    pub fn start(state: &GameState, questions: Vec<QuizQuestion>) -> Result<Self, CoreError> {
        if state.hearts == 0 {
            return Err(Rejection::HeartsDepleted.into());
        }
        if questions.is_empty() {
            return Err(ValidationError::EmptyCollection("quiz questions".into()).into());
        }
        debug!(questions = questions.len(), "battle started");
        Ok(Self {
            questions,
            index: 0,
            combo: 0,
            misses: 0,
            finished: false,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current(&self) -> Option<&QuizQuestion> {
        if self.finished {
            return None;
        }
        self.questions.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether `answer` would clear the battle: the last question, answered right.
    pub fn clears_with(&self, answer: &str) -> bool {
        self.current()
            .is_some_and(|q| self.index + 1 == self.questions.len() && q.is_correct(answer))
    }

    /// 0 .. 100, counting the question on screen as reached.
    pub fn progress_pct(&self) -> u32 {
        (((self.index + 1) * 100) / self.questions.len()).min(100) as u32
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Score `answer` against the current question.
    pub fn answer(&mut self, state: &GameState, answer: &str) -> Result<BattleStep, CoreError> {
        let Some(question) = self.current() else {
            return Err(ValidationError::Finished("battle".into()).into());
        };
        let correct = question.is_correct(answer);
        let question_index = self.index;
        let is_last = question_index + 1 == self.questions.len();

        let mut next = state.clone();
        let mut events = Vec::new();

        let outcome = if correct {
            let combo_before = self.combo;
            self.combo += 1;
            events.push(Event::AnswerCorrect {
                question_index,
                combo: self.combo,
            });
            if is_last {
                self.finished = true;
                AnswerOutcome::Cleared {
                    combo_before,
                    xp: BASE_ANSWER_XP + COMBO_XP_BONUS * combo_before,
                    flawless: self.misses == 0,
                }
            } else {
                self.index += 1;
                AnswerOutcome::Advanced {
                    next_index: self.index,
                }
            }
        } else {
            self.combo = 0;
            self.misses += 1;
            if let Some(pos) = next.active_buffs.iter().position(|b| b == SHIELD) {
                next.active_buffs.remove(pos);
                events.push(Event::ShieldAbsorbed { question_index });
                self.advance_or_fail(is_last, &mut events, question_index, |next_index| {
                    AnswerOutcome::Shielded { next_index }
                })
            } else {
                next.hearts = next.hearts.saturating_sub(1);
                events.push(Event::AnswerWrong {
                    question_index,
                    hearts_left: next.hearts,
                });
                if next.hearts == 0 {
                    self.finished = true;
                    events.push(Event::BattleLost { question_index });
                    AnswerOutcome::Defeated
                } else {
                    let hearts_left = next.hearts;
                    self.advance_or_fail(is_last, &mut events, question_index, |next_index| {
                        AnswerOutcome::Missed {
                            hearts_left,
                            next_index,
                        }
                    })
                }
            }
        };

        debug!(question_index, correct, combo = self.combo, ?outcome, "answer scored");
        Ok(BattleStep {
            transition: Transition {
                state: next,
                events,
            },
            outcome,
        })
    }

    fn advance_or_fail(
        &mut self,
        is_last: bool,
        events: &mut Vec<Event>,
        question_index: usize,
        on_advance: impl FnOnce(usize) -> AnswerOutcome,
    ) -> AnswerOutcome {
        if is_last {
            self.finished = true;
            events.push(Event::BattleFailed { question_index });
            AnswerOutcome::Failed
        } else {
            self.index += 1;
            on_advance(self.index)
        }
    }
}
