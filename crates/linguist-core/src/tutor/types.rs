//! Request/response payloads exchanged with the AI collaborator.

use serde::{Deserialize, Serialize};

use crate::game::catalog::LanguageLevel;
use crate::game::VocabularyItem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestRequest {
    pub language: String,
    pub level: LanguageLevel,
    pub topic: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    #[default]
    Discovery,
    Battle,
    Stealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScientificCategory {
    Geology,
    Biology,
    Astronomy,
    Physics,
    #[default]
    Culture,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub original: String,
    pub translated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationalFact {
    pub topic: String,
    pub fact: String,
    #[serde(default)]
    pub image_prompt: String,
}

/// A generated quest. The model does not return `id` or `difficulty`; the
/// client fills them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub narrative: String,
    pub content: String,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyItem>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub quest_type: QuestType,
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default)]
    pub scientific_category: ScientificCategory,
    #[serde(default)]
    pub educational_fact: Option<EducationalFact>,
}

fn default_difficulty() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

/// Free-text feedback on a learner sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub grammar: String,
    pub pronunciation: String,
    #[serde(default)]
    pub phonetics: String,
    pub naturalness: String,
    pub score: f64,
}
