//! # Linguist Core Library
//!
//! The progression engine behind the Linguist language game, plus the
//! pieces needed to play it from a terminal: persistence, configuration and
//! a client for the AI tutor that writes quests, quizzes and card art.
//!
//! ## Architecture
//!
//! - **Game**: one [`GameState`] record and pure rules over it. Each rule
//!   takes the prior state and returns a [`Transition`] (next state plus
//!   [`Event`]s). Streaks, battles, quest completion, the shop, daily goals
//!   and achievements all live here.
//! - **Storage**: TOML [`Config`] and the [`StateStore`], the single writer
//!   of the JSON game record.
//! - **Tutor**: the [`Tutor`] contract, a Gemini implementation, deadline and
//!   cancellation helpers, and the live voice session state machine.
//! - **Play**: [`QuestRun`] ties a tutor to the store for one quest;
//!   [`OracleCall`] ties a voice session to it.

pub mod error;
pub mod events;
pub mod game;
pub mod play;
pub mod storage;
pub mod tutor;

pub use error::{ConfigError, CoreError, Rejection, TutorError, ValidationError};
pub use events::Event;
pub use game::{AnswerOutcome, BattleSession, GameState, Screen, Transition};
pub use play::{OracleCall, QuestRun, RunStep};
pub use storage::{Config, StateStore};
pub use tutor::{CancelToken, GeminiTutor, Tutor, VoiceSession, VoiceState};
