//! Progression engine.
//!
//! Every rule is a function from the prior [`GameState`] to a
//! [`Transition`]: the next record plus the events describing what changed.
//! Nothing here mutates shared state or touches the disk; the caller commits
//! the new record through [`crate::storage::StateStore`].

pub mod arena;
pub mod battle;
pub mod catalog;
pub mod completion;
pub mod leveling;
pub mod shop;
pub mod state;
pub mod streak;
pub mod tracker;

pub use battle::{AnswerOutcome, BattleSession, BattleStep};
pub use state::{Achievement, DailyGoal, GameState, VocabularyItem};

use serde::Serialize;

use crate::events::Event;

/// Where the player lands after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Map,
    Quest,
    Battle,
}

/// Result of applying one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<Event>,
}

impl Transition {
    /// A transition that changed nothing.
    pub fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }

    /// Feed this transition's state into `next`, concatenating events.
    pub fn then(self, next: impl FnOnce(&GameState) -> Transition) -> Transition {
        let Transition { state, mut events } = self;
        let after = next(&state);
        events.extend(after.events);
        Transition {
            state: after.state,
            events,
        }
    }
}
