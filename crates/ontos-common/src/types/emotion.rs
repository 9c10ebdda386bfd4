//! EmotionalState - a short-lived, decaying signal attached to an owner
//!
//! External events overwrite the state; host ticks count it down until it
//! falls back to neutral. The state is a read-only input to behavior selection
//! (commentary, chaos injection) and never feeds back into the floors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OntosError, Result};

/// Emotional kinds an owner can be in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionKind {
    Excited,
    Frustrated,
    Triumphant,
    Sarcastic,
    Playful,
    Curious,
    #[default]
    Neutral,
}

impl EmotionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionKind::Excited => "excited",
            EmotionKind::Frustrated => "frustrated",
            EmotionKind::Triumphant => "triumphant",
            EmotionKind::Sarcastic => "sarcastic",
            EmotionKind::Playful => "playful",
            EmotionKind::Curious => "curious",
            EmotionKind::Neutral => "neutral",
        }
    }
}

impl fmt::Display for EmotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task outcome events reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalEvent {
    Success,
    Failure,
    Transcend,
    Bug,
    Chaos,
    Learning,
}

impl EmotionalEvent {
    /// Deterministic event → emotion mapping
    pub fn emotion(&self) -> EmotionKind {
        match self {
            EmotionalEvent::Success => EmotionKind::Excited,
            EmotionalEvent::Failure => EmotionKind::Frustrated,
            EmotionalEvent::Transcend => EmotionKind::Triumphant,
            EmotionalEvent::Bug => EmotionKind::Sarcastic,
            EmotionalEvent::Chaos => EmotionKind::Playful,
            EmotionalEvent::Learning => EmotionKind::Curious,
        }
    }
}

impl FromStr for EmotionalEvent {
    type Err = OntosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(EmotionalEvent::Success),
            "failure" => Ok(EmotionalEvent::Failure),
            "transcend" => Ok(EmotionalEvent::Transcend),
            "bug" => Ok(EmotionalEvent::Bug),
            "chaos" => Ok(EmotionalEvent::Chaos),
            "learning" => Ok(EmotionalEvent::Learning),
            other => Err(OntosError::invalid(format!("unknown event kind '{}'", other))),
        }
    }
}

/// Tone used when producing commentary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentaryStyle {
    Enthusiastic,
    Sarcastic,
    Snarky,
    Boastful,
    Teasing,
    Inquisitive,
    Normal,
}

/// Current emotional state of an owner
///
/// Invariant: `remaining_duration == 0` implies `kind == Neutral` and
/// `intensity == 0.0`. Fields are private so the invariant holds for every
/// value of this type, including deserialized ones.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawEmotionalState")]
pub struct EmotionalState {
    kind: EmotionKind,
    intensity: f64,
    remaining_duration: u32,
}

/// Untrusted persisted form, normalized on the way in
#[derive(Deserialize)]
struct RawEmotionalState {
    #[serde(default)]
    kind: EmotionKind,
    #[serde(default)]
    intensity: f64,
    #[serde(default)]
    remaining_duration: u32,
}

impl From<RawEmotionalState> for EmotionalState {
    fn from(raw: RawEmotionalState) -> Self {
        if raw.remaining_duration == 0 || raw.kind == EmotionKind::Neutral {
            return Self::default();
        }
        let intensity = if raw.intensity.is_finite() {
            raw.intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            kind: raw.kind,
            intensity,
            remaining_duration: raw.remaining_duration,
        }
    }
}

impl EmotionalState {
    /// A fresh neutral state
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> EmotionKind {
        self.kind
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn remaining_duration(&self) -> u32 {
        self.remaining_duration
    }

    pub fn is_neutral(&self) -> bool {
        self.kind == EmotionKind::Neutral
    }

    /// Overwrite the state from an external event
    ///
    /// A zero duration leaves the owner neutral. Validation happens before any
    /// write, so a rejected update leaves the state unchanged.
    pub fn update(&mut self, event: EmotionalEvent, intensity: f64, duration: i64) -> Result<()> {
        if !intensity.is_finite() || !(0.0..=1.0).contains(&intensity) {
            return Err(OntosError::invalid(format!(
                "intensity must be in [0, 1], got {}",
                intensity
            )));
        }
        if duration < 0 {
            return Err(OntosError::invalid(format!(
                "duration must be non-negative, got {}",
                duration
            )));
        }
        let duration = u32::try_from(duration)
            .map_err(|_| OntosError::invalid(format!("duration {} too large", duration)))?;

        if duration == 0 {
            *self = Self::default();
        } else {
            *self = Self {
                kind: event.emotion(),
                intensity,
                remaining_duration: duration,
            };
        }
        Ok(())
    }

    /// Advance one host tick
    pub fn tick(&mut self) {
        self.remaining_duration = self.remaining_duration.saturating_sub(1);
        if self.remaining_duration == 0 {
            *self = Self::default();
        }
    }

    /// Tone implied by the current emotion
    pub fn commentary_style(&self) -> CommentaryStyle {
        match self.kind {
            EmotionKind::Excited => CommentaryStyle::Enthusiastic,
            EmotionKind::Sarcastic => CommentaryStyle::Sarcastic,
            EmotionKind::Frustrated => CommentaryStyle::Snarky,
            EmotionKind::Triumphant => CommentaryStyle::Boastful,
            EmotionKind::Playful => CommentaryStyle::Teasing,
            EmotionKind::Curious => CommentaryStyle::Inquisitive,
            EmotionKind::Neutral => CommentaryStyle::Normal,
        }
    }
}
