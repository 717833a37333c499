//! Live voice session with the tutor or the oracle.
//!
//! The session is a small state machine:
//!
//! ```text
//! Idle -> Connecting -> Active -> Closing -> Idle
//! ```
//!
//! Transport and audio devices live outside the crate. The caller feeds
//! socket lifecycle callbacks and decoded server messages in, and gets state
//! events, transcript lines and scheduled playback chunks back. Like the
//! other engines in this crate, an illegal transition returns `None`.

use std::collections::VecDeque;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::cancel::CancelToken;
use crate::events::Event;
use crate::game::catalog::LanguageLevel;

/// Upstream microphone sample rate.
pub const INPUT_SAMPLE_RATE: u32 = 16_000;
/// Downstream speech sample rate.
pub const OUTPUT_SAMPLE_RATE: u32 = 24_000;
/// Transcript lines kept on screen.
pub const TRANSCRIPT_LINES: usize = 5;
/// Phrase the oracle speaks when the learner passes.
pub const ACCESS_PHRASE: &str = "ACCESS GRANTED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceState {
    Idle,
    Connecting,
    Active,
    Closing,
}

/// Who the learner is talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    Tutor,
    Oracle,
}

impl Persona {
    pub fn system_instruction(self, language: &str, level: LanguageLevel) -> String {
        match self {
            Persona::Tutor => format!(
                "You are a friendly {language} language tutor for a {level} level student. \
                 Speak clearly, encourage the user, and help them practice conversation. \
                 Occasionally correct their grammar in a kind way."
            ),
            Persona::Oracle => format!(
                "You are the \"Linguist Oracle\". You speak {language}. Challenge the user \
                 with a 2-minute conversation appropriate for {level} level. \
                 If they do well, say \"{ACCESS_PHRASE}\"."
            ),
        }
    }

    fn speaker(self) -> &'static str {
        match self {
            Persona::Tutor => "AI",
            Persona::Oracle => "Oracle",
        }
    }
}

// ── Server messages ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMessage {
    #[serde(default)]
    pub server_content: Option<ServerContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerContent {
    #[serde(default)]
    pub model_turn: Option<ModelTurn>,
    #[serde(default)]
    pub input_transcription: Option<Transcription>,
    #[serde(default)]
    pub output_transcription: Option<Transcription>,
    #[serde(default)]
    pub interrupted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelTurn {
    #[serde(default)]
    pub parts: Vec<TurnPart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnPart {
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub data: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transcription {
    pub text: String,
}

/// Audio to play, positioned on the output clock.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackChunk {
    /// Start time in seconds on the caller's output clock.
    pub start: f64,
    pub samples: Vec<f32>,
}

impl PlaybackChunk {
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / f64::from(OUTPUT_SAMPLE_RATE)
    }
}

/// What a server message asks the caller to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageEffects {
    pub playback: Option<PlaybackChunk>,
    /// Stop everything queued for playback.
    pub interrupted: bool,
    /// The oracle just granted access. Reported once per session.
    pub access_granted: bool,
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct VoiceSession {
    persona: Persona,
    language: String,
    level: LanguageLevel,
    state: VoiceState,
    transcript: VecDeque<String>,
    next_start: f64,
    access_granted: bool,
    cancel: CancelToken,
}

impl VoiceSession {
    pub fn new(persona: Persona, language: impl Into<String>, level: LanguageLevel) -> Self {
        Self {
            persona,
            language: language.into(),
            level,
            state: VoiceState::Idle,
            transcript: VecDeque::with_capacity(TRANSCRIPT_LINES),
            next_start: 0.0,
            access_granted: false,
            cancel: CancelToken::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn transcript(&self) -> impl Iterator<Item = &str> {
        self.transcript.iter().map(String::as_str)
    }

    pub fn access_granted(&self) -> bool {
        self.access_granted
    }

    /// Token the transport should watch; tripped by [`close`](Self::close).
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// First frame sent on the socket.
    pub fn setup_frame(&self, model: &str) -> Value {
        json!({
            "setup": {
                "model": format!("models/{model}"),
                "generationConfig": { "responseModalities": ["AUDIO"] },
                "systemInstruction": {
                    "parts": [{ "text": self.persona.system_instruction(&self.language, self.level) }]
                },
                "inputAudioTranscription": {},
                "outputAudioTranscription": {}
            }
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Connecting. Starts a fresh session.
    pub fn connect(&mut self) -> Option<Event> {
        if self.state != VoiceState::Idle {
            return None;
        }
        self.transcript.clear();
        self.next_start = 0.0;
        self.access_granted = false;
        self.cancel = CancelToken::new();
        Some(self.move_to(VoiceState::Connecting))
    }

    /// Connecting -> Active, once the socket is open.
    pub fn opened(&mut self) -> Option<Event> {
        if self.state != VoiceState::Connecting {
            return None;
        }
        Some(self.move_to(VoiceState::Active))
    }

    /// Connecting or Active -> Closing. Trips the cancel token.
    pub fn close(&mut self) -> Option<Event> {
        match self.state {
            VoiceState::Connecting | VoiceState::Active => {
                self.cancel.cancel();
                Some(self.move_to(VoiceState::Closing))
            }
            _ => None,
        }
    }

    /// Socket gone, whether we asked for it or not (error, server close).
    pub fn closed(&mut self) -> Option<Event> {
        if self.state == VoiceState::Idle {
            return None;
        }
        self.cancel.cancel();
        self.next_start = 0.0;
        Some(self.move_to(VoiceState::Idle))
    }

    /// Apply one server message. `now` is the output clock in seconds.
    /// Messages outside the Active state are dropped.
    pub fn handle(&mut self, message: &ServerMessage, now: f64) -> MessageEffects {
        let mut effects = MessageEffects::default();
        if self.state != VoiceState::Active {
            return effects;
        }
        let Some(content) = &message.server_content else {
            return effects;
        };

        if let Some(out) = &content.output_transcription {
            self.push_line(format!("{}: {}", self.persona.speaker(), out.text));
            if self.persona == Persona::Oracle
                && !self.access_granted
                && out.text.to_uppercase().contains(ACCESS_PHRASE)
            {
                self.access_granted = true;
                effects.access_granted = true;
            }
        }
        if let Some(input) = &content.input_transcription {
            self.push_line(format!("You: {}", input.text));
        }

        let audio = content
            .model_turn
            .as_ref()
            .and_then(|turn| turn.parts.iter().find_map(|p| p.inline_data.as_ref()));
        if let Some(inline) = audio {
            match decode_pcm16(&inline.data) {
                Ok(samples) => effects.playback = Some(self.schedule(samples, now)),
                Err(e) => warn!(error = %e, "dropping undecodable audio chunk"),
            }
        }

        if content.interrupted {
            self.next_start = 0.0;
            effects.interrupted = true;
            effects.playback = None;
        }
        effects
    }

    fn schedule(&mut self, samples: Vec<f32>, now: f64) -> PlaybackChunk {
        let chunk = PlaybackChunk {
            start: self.next_start.max(now),
            samples,
        };
        self.next_start = chunk.start + chunk.duration();
        chunk
    }

    fn push_line(&mut self, line: String) {
        self.transcript.push_back(line);
        while self.transcript.len() > TRANSCRIPT_LINES {
            self.transcript.pop_front();
        }
    }

    fn move_to(&mut self, to: VoiceState) -> Event {
        let from = std::mem::replace(&mut self.state, to);
        debug!(?from, ?to, "voice session");
        Event::VoiceStateChanged { from, to }
    }
}

// ── Audio codec ──────────────────────────────────────────────────────

/// Microphone samples as a realtime-input frame.
pub fn realtime_input_frame(samples: &[f32]) -> Value {
    json!({
        "realtimeInput": {
            "mediaChunks": [{
                "mimeType": format!("audio/pcm;rate={INPUT_SAMPLE_RATE}"),
                "data": encode_pcm16(samples),
            }]
        }
    })
}

/// Float samples in `[-1, 1]` to base64 PCM16 little-endian. Out of range
/// samples are clamped.
pub fn encode_pcm16(samples: &[f32]) -> String {
    let bytes: Vec<u8> = samples
        .iter()
        .flat_map(|s| {
            let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
            v.to_le_bytes()
        })
        .collect();
    STANDARD.encode(bytes)
}

/// Base64 PCM16 little-endian to float samples. A trailing odd byte is
/// ignored.
pub fn decode_pcm16(data: &str) -> Result<Vec<f32>, base64::DecodeError> {
    let bytes = STANDARD.decode(data)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / 32768.0)
        .collect())
}
