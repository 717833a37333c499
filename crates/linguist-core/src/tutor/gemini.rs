//! Gemini `generateContent` backend.
//!
//! Every content request asks the model for JSON matching a response schema,
//! then reads the text of the first candidate and decodes it. Art requests
//! use an image model and read the first inline-data part instead.

use indoc::formatdoc;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::types::{Feedback, Lesson, QuestRequest, QuizQuestion};
use super::Tutor;
use crate::error::TutorError;
use crate::storage::TutorConfig;

pub struct GeminiTutor {
    client: reqwest::Client,
    config: TutorConfig,
    api_key: String,
}

impl GeminiTutor {
    /// Build a client, reading the API key from the configured env var.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::MissingApiKey`] if the variable is unset.
    pub fn from_config(config: &TutorConfig) -> Result<Self, TutorError> {
        let api_key = config.api_key().ok_or_else(|| TutorError::MissingApiKey {
            env: config.api_key_env.clone(),
        })?;
        Ok(Self::with_api_key(config, api_key))
    }

    pub fn with_api_key(config: &TutorConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            api_key: api_key.into(),
        }
    }

    async fn generate(&self, model: &str, body: &Value) -> Result<Value, TutorError> {
        let url = format!(
            "{}/v1beta/models/{model}:generateContent",
            self.config.base_url.trim_end_matches('/')
        );
        debug!(%model, "tutor request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| TutorError::Http {
                model: model.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(TutorError::Status {
                model: model.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(|e| TutorError::Malformed {
            model: model.to_string(),
            message: e.to_string(),
        })
    }

    async fn generate_json<T: DeserializeOwned>(
        &self,
        model: &str,
        prompt: &str,
        schema: Value,
    ) -> Result<T, TutorError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        });
        let response = self.generate(model, &body).await?;
        let text = extract_text(&response, model)?;
        serde_json::from_str(&text).map_err(|e| TutorError::Malformed {
            model: model.to_string(),
            message: format!("response text is not the requested JSON: {e}"),
        })
    }
}

impl Tutor for GeminiTutor {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn quest(&self, request: &QuestRequest) -> Result<Lesson, TutorError> {
        let prompt = formatdoc! {"
            You are the Master Synapse AI Teacher. Create a {level} quest for the language {language}.
            Topic: {topic}.
            Integrate real scientific education into the lesson: teach the language while
            explaining the science behind the topic, using its terminology in {language}.
            Format the response as JSON.",
            level = request.level,
            language = request.language,
            topic = request.topic,
        };
        let mut lesson: Lesson = self
            .generate_json(&self.config.quest_model, &prompt, quest_schema())
            .await?;
        if lesson.id.is_empty() {
            lesson.id = uuid::Uuid::new_v4().simple().to_string();
        }
        info!(title = %lesson.title, words = lesson.vocabulary.len(), "quest generated");
        Ok(lesson)
    }

    async fn quiz(
        &self,
        language: &str,
        lesson_text: &str,
    ) -> Result<Vec<QuizQuestion>, TutorError> {
        let prompt = format!(
            "Generate a challenging 5-question quiz for {language} based on this text: {lesson_text}"
        );
        let questions: Vec<QuizQuestion> = self
            .generate_json(&self.config.quiz_model, &prompt, quiz_schema())
            .await?;
        if questions.iter().any(|q| !q.options.contains(&q.correct_answer)) {
            return Err(TutorError::Malformed {
                model: self.config.quiz_model.clone(),
                message: "a question's correct answer is not among its options".into(),
            });
        }
        Ok(questions)
    }

    async fn art(&self, word: &str, language: &str) -> Result<Option<String>, TutorError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": format!(
                "A futuristic holographic card showing '{word}' in {language}. Cyan glowing borders, 4k, digital art."
            ) }] }]
        });
        let response = self.generate(&self.config.art_model, &body).await?;
        Ok(extract_inline_image(&response))
    }

    async fn feedback(&self, language: &str, text: &str) -> Result<Feedback, TutorError> {
        let prompt = formatdoc! {"
            Analyze this {language} input: \"{text}\".
            1. Grammar analysis.
            2. Pronunciation phonetics (how to say it).
            3. Naturalness score (0-100).
            Provide feedback as a master teacher."
        };
        self.generate_json(&self.config.feedback_model, &prompt, feedback_schema())
            .await
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(json: &Value, model: &str) -> Result<String, TutorError> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| TutorError::Malformed {
            model: model.to_string(),
            message: "response missing candidates[0].content.parts".to_owned(),
        })?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        return Err(TutorError::Malformed {
            model: model.to_string(),
            message: "response has no text part".to_owned(),
        });
    }
    Ok(text)
}

/// First inline image of the first candidate, as a data URL.
fn extract_inline_image(json: &Value) -> Option<String> {
    json.pointer("/candidates/0/content/parts")?
        .as_array()?
        .iter()
        .filter_map(|p| p.get("inlineData"))
        .find_map(|inline| {
            let data = inline.get("data")?.as_str()?;
            let mime = inline
                .get("mimeType")
                .and_then(Value::as_str)
                .unwrap_or("image/png");
            Some(format!("data:{mime};base64,{data}"))
        })
}

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn quest_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "narrative": { "type": "STRING" },
            "content": { "type": "STRING" },
            "questType": { "type": "STRING", "enum": ["discovery", "battle", "stealth"] },
            "scientificCategory": {
                "type": "STRING",
                "enum": ["geology", "biology", "astronomy", "physics", "culture"]
            },
            "educationalFact": {
                "type": "OBJECT",
                "properties": {
                    "topic": { "type": "STRING" },
                    "fact": { "type": "STRING" },
                    "imagePrompt": { "type": "STRING" }
                }
            },
            "vocabulary": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": { "type": "STRING" },
                        "translation": { "type": "STRING" }
                    }
                }
            },
            "examples": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "original": { "type": "STRING" },
                        "translated": { "type": "STRING" }
                    }
                }
            }
        },
        "required": [
            "title", "narrative", "content", "vocabulary", "examples",
            "questType", "educationalFact", "scientificCategory"
        ]
    })
}

fn quiz_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING" },
                "options": string_array(),
                "correctAnswer": { "type": "STRING" },
                "explanation": { "type": "STRING" }
            }
        }
    })
}

fn feedback_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "grammar": { "type": "STRING" },
            "pronunciation": { "type": "STRING" },
            "phonetics": { "type": "STRING" },
            "naturalness": { "type": "STRING" },
            "score": { "type": "NUMBER" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::LanguageLevel;

    fn candidate_text(text: &str) -> String {
        json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })
        .to_string()
    }

    fn tutor_for(server: &mockito::Server) -> GeminiTutor {
        let config = TutorConfig {
            base_url: server.url(),
            ..TutorConfig::default()
        };
        GeminiTutor::with_api_key(&config, "test-key")
    }

    #[tokio::test]
    async fn quest_is_parsed_and_given_an_id() {
        let mut server = mockito::Server::new_async().await;
        let lesson = json!({
            "title": "Magma Mysteries",
            "narrative": "The mountain rumbles.",
            "content": "El magma sube.",
            "questType": "discovery",
            "scientificCategory": "geology",
            "educationalFact": { "topic": "Magma", "fact": "Hot.", "imagePrompt": "volcano" },
            "vocabulary": [{ "word": "magma", "translation": "magma" }],
            "examples": [{ "original": "El magma sube.", "translated": "Magma rises." }]
        });
        let mock = server
            .mock("POST", "/v1beta/models/gemini-3-pro-preview:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_body(candidate_text(&lesson.to_string()))
            .create_async()
            .await;

        let tutor = tutor_for(&server);
        let request = QuestRequest {
            language: "Spanish".into(),
            level: LanguageLevel::Beginner,
            topic: "Volcanoes".into(),
        };
        let quest = tutor.quest(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(quest.title, "Magma Mysteries");
        assert_eq!(quest.difficulty, 1);
        assert!(!quest.id.is_empty());
        assert_eq!(quest.vocabulary[0].mastery, 0);
    }

    #[tokio::test]
    async fn quiz_rejects_answer_outside_options() {
        let mut server = mockito::Server::new_async().await;
        let quiz = json!([{
            "question": "¿Qué es magma?",
            "options": ["roca fundida", "agua"],
            "correctAnswer": "fuego",
            "explanation": ""
        }]);
        server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .with_body(candidate_text(&quiz.to_string()))
            .create_async()
            .await;

        let err = tutor_for(&server).quiz("Spanish", "text").await.unwrap_err();
        assert!(matches!(err, TutorError::Malformed { .. }));
    }

    #[tokio::test]
    async fn quiz_parses_questions() {
        let mut server = mockito::Server::new_async().await;
        let quiz = json!([{
            "question": "¿Qué es magma?",
            "options": ["roca fundida", "agua"],
            "correctAnswer": "roca fundida",
            "explanation": "Magma is molten rock."
        }]);
        server
            .mock("POST", "/v1beta/models/gemini-3-flash-preview:generateContent")
            .with_body(candidate_text(&quiz.to_string()))
            .create_async()
            .await;

        let questions = tutor_for(&server).quiz("Spanish", "text").await.unwrap();
        assert_eq!(questions.len(), 1);
        assert!(questions[0].is_correct("roca fundida"));
    }

    #[tokio::test]
    async fn art_reads_inline_data() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "here you go" },
                { "inlineData": { "mimeType": "image/png", "data": "iVBORw0" } }
            ] } }]
        });
        server
            .mock("POST", "/v1beta/models/gemini-2.5-flash-image:generateContent")
            .with_body(body.to_string())
            .create_async()
            .await;

        let art = tutor_for(&server).art("magma", "Spanish").await.unwrap();
        assert_eq!(art.as_deref(), Some("data:image/png;base64,iVBORw0"));
    }

    #[tokio::test]
    async fn art_without_image_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini-2.5-flash-image:generateContent")
            .with_body(candidate_text("sorry, no picture"))
            .create_async()
            .await;

        let art = tutor_for(&server).art("magma", "Spanish").await.unwrap();
        assert!(art.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini-3-pro-preview:generateContent")
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;

        let err = tutor_for(&server)
            .feedback("Spanish", "hola")
            .await
            .unwrap_err();
        match err {
            TutorError::Status { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_text_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1beta/models/gemini-3-pro-preview:generateContent")
            .with_body(candidate_text("not json at all"))
            .create_async()
            .await;

        let err = tutor_for(&server)
            .feedback("Spanish", "hola")
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::Malformed { .. }));
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let config = TutorConfig {
            api_key_env: "LINGUIST_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..TutorConfig::default()
        };
        assert!(matches!(
            GeminiTutor::from_config(&config),
            Err(TutorError::MissingApiKey { .. })
        ));
    }

    #[test]
    fn extract_text_requires_parts() {
        assert!(extract_text(&json!({}), "m").is_err());
        let ok = json!({ "candidates": [{ "content": { "parts": [{ "text": "a" }, { "text": "b" }] } }] });
        assert_eq!(extract_text(&ok, "m").unwrap(), "ab");
    }
}
