//! AI collaborator: quest, quiz, art and feedback generation, plus the live
//! voice session.

pub mod cancel;
pub mod gemini;
pub mod types;
pub mod voice;

pub use cancel::{with_deadline, CancelToken};
pub use gemini::GeminiTutor;
pub use types::{Feedback, Lesson, QuestRequest, QuizQuestion};
pub use voice::{Persona, VoiceSession, VoiceState};

use crate::error::TutorError;

/// Content source for quests and battles.
///
/// Calls may be slow; callers wrap them in [`with_deadline`].
#[allow(async_fn_in_trait)]
pub trait Tutor: Send + Sync {
    fn name(&self) -> &str;

    async fn quest(&self, request: &QuestRequest) -> Result<Lesson, TutorError>;

    async fn quiz(&self, language: &str, lesson_text: &str)
        -> Result<Vec<QuizQuestion>, TutorError>;

    /// Card art for a collected word. `Ok(None)` when the model returned no image.
    async fn art(&self, word: &str, language: &str) -> Result<Option<String>, TutorError>;

    async fn feedback(&self, language: &str, text: &str) -> Result<Feedback, TutorError>;
}
