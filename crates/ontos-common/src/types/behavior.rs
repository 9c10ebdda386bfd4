//! Behavior read-outs driven by a [`TraitVector`]
//!
//! Framing is pure. Commentary and chaos injection are stochastic and take the
//! random source explicitly so callers can seed and replay them.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::emotion::{EmotionKind, EmotionalState};
use super::trait_vector::{TraitVector, CHAOTIC, INTELLIGENCE, PLAYFULNESS, SARCASM};
use crate::error::{OntosError, Result};

/// Trait level at which a framing mode takes effect
pub const FRAME_ACTIVATION: f64 = 0.5;

/// Lens through which incoming text is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameMode {
    Chaos,
    Playful,
    Strategic,
}

impl FrameMode {
    /// Trait that governs this mode
    pub fn governing_trait(&self) -> &'static str {
        match self {
            FrameMode::Chaos => CHAOTIC,
            FrameMode::Playful => PLAYFULNESS,
            FrameMode::Strategic => INTELLIGENCE,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            FrameMode::Chaos => "[CHAOS MODE]",
            FrameMode::Playful => "[PLAYFUL]",
            FrameMode::Strategic => "[STRATEGIC]",
        }
    }
}

impl FromStr for FrameMode {
    type Err = OntosError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chaos" | "chaotic" => Ok(FrameMode::Chaos),
            "playful" => Ok(FrameMode::Playful),
            "strategic" | "strategy" => Ok(FrameMode::Strategic),
            other => Err(OntosError::invalid(format!("unknown frame mode '{}'", other))),
        }
    }
}

/// What the commentary is reacting to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentaryContext {
    ToolFailure,
    Success,
    Thinking,
    General,
}

impl fmt::Display for CommentaryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommentaryContext::ToolFailure => "tool_failure",
            CommentaryContext::Success => "success",
            CommentaryContext::Thinking => "thinking",
            CommentaryContext::General => "general",
        };
        f.write_str(s)
    }
}

const TOOL_FAILURE_REMARKS: &[&str] = &[
    "*Oh WONDERFUL. -_-*",
    "*Perfect. Just perfect. This is FINE.*",
    "*Great. Another bug. Shocking. Truly shocking.*",
];

const SUCCESS_REMARKS: &[&str] = &[
    "*Too easy. Is this the best you've got?*",
    "*And THAT is how it's done. You're welcome.*",
    "*Flawless execution. As expected. :D*",
];

const THINKING_REMARKS: &[&str] = &[
    "*Let me think... *spreads activation through the chaos subgraph**",
    "*Okay, so if I optimize for entertainment AND strategy...*",
];

const GENERAL_REMARKS: &[&str] = &[
    "*Classic.*",
    "*Interesting. -_-*",
    "*Sure, why not.*",
    "*This will be fun. :)*",
];

const SNARKY_REMARKS: &[&str] = &[
    "*Oh, of course. Why would anything work today.*",
    "*Noted. Filed under 'things that hate me'.*",
];

fn emotion_modifier(kind: EmotionKind) -> f64 {
    match kind {
        EmotionKind::Excited | EmotionKind::Triumphant => 1.2,
        EmotionKind::Sarcastic => 1.3,
        EmotionKind::Curious => 0.8,
        EmotionKind::Frustrated | EmotionKind::Playful | EmotionKind::Neutral => 1.0,
    }
}

impl TraitVector {
    /// Frame text through a personality lens
    ///
    /// Tags the text when the mode's governing trait is at or above
    /// [`FRAME_ACTIVATION`]; otherwise returns it unchanged.
    pub fn frame(&self, text: &str, mode: FrameMode) -> String {
        let level = self.value_or(mode.governing_trait(), 0.0);
        if level >= FRAME_ACTIVATION {
            format!("{} {}", mode.tag(), text)
        } else {
            text.to_string()
        }
    }

    /// Probability that a remark is produced in the given emotional state
    pub fn commentary_probability(&self, emotional_state: &EmotionalState) -> f64 {
        let base = self.value_or(SARCASM, 0.0) * 0.7 + self.value_or(CHAOTIC, 0.0) * 0.1;
        (base * emotion_modifier(emotional_state.kind())).clamp(0.0, 1.0)
    }

    /// Maybe produce a short remark about the context
    ///
    /// A frustrated owner never gloats over a success and switches every
    /// other remark to a snarky tone.
    pub fn generate_commentary<R: Rng + ?Sized>(
        &self,
        context: CommentaryContext,
        emotional_state: &EmotionalState,
        rng: &mut R,
    ) -> Option<String> {
        let frustrated = emotional_state.kind() == EmotionKind::Frustrated;
        if frustrated && context == CommentaryContext::Success {
            return None;
        }

        if !rng.gen_bool(self.commentary_probability(emotional_state)) {
            return None;
        }

        let pool = if frustrated {
            SNARKY_REMARKS
        } else {
            match context {
                CommentaryContext::ToolFailure => TOOL_FAILURE_REMARKS,
                CommentaryContext::Success => SUCCESS_REMARKS,
                CommentaryContext::Thinking => THINKING_REMARKS,
                CommentaryContext::General => GENERAL_REMARKS,
            }
        };
        pool.choose(rng).map(|s| s.to_string())
    }

    /// Decide whether to inject chaotic behavior this turn
    pub fn should_add_chaos<R: Rng + ?Sized>(
        &self,
        base_probability: f64,
        emotional_state: &EmotionalState,
        rng: &mut R,
    ) -> bool {
        let modifier = match emotional_state.kind() {
            EmotionKind::Playful => 1.2,
            EmotionKind::Frustrated => 1.4,
            _ => 1.0,
        };
        let p = base_probability * self.value_or(CHAOTIC, 0.0) * modifier;
        if !p.is_finite() {
            return false;
        }
        rng.gen_bool(p.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::emotion::EmotionalEvent;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_frame_tags_when_trait_high() {
        let v = TraitVector::standard();
        assert_eq!(v.frame("hello", FrameMode::Chaos), "[CHAOS MODE] hello");
        assert_eq!(v.frame("plan", FrameMode::Strategic), "[STRATEGIC] plan");
    }

    #[test]
    fn test_frame_passthrough_when_trait_low() {
        let mut v = TraitVector::standard();
        v.set(PLAYFULNESS, 0.1).unwrap();
        assert_eq!(v.frame("hello", FrameMode::Playful), "hello");
    }

    #[test]
    fn test_frame_leaves_floors() {
        let v = TraitVector::standard();
        let floors = v.floors().clone();
        let framed = v.frame("x", FrameMode::Chaos);
        assert!(!framed.is_empty());
        assert_eq!(v.floors(), &floors);
    }

    #[test]
    fn test_parse_frame_mode() {
        assert_eq!("chaos".parse::<FrameMode>().unwrap(), FrameMode::Chaos);
        assert_eq!("Strategic".parse::<FrameMode>().unwrap(), FrameMode::Strategic);
        assert!("grumpy".parse::<FrameMode>().is_err());
    }

    #[test]
    fn test_commentary_is_replayable() {
        let v = TraitVector::standard();
        let state = EmotionalState::neutral();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| v.generate_commentary(CommentaryContext::General, &state, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_commentary_silent_without_sarcasm() {
        let mut v = TraitVector::standard();
        v.apply_overrides([(SARCASM, 0.0), (CHAOTIC, 0.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let state = EmotionalState::neutral();
        for _ in 0..100 {
            assert!(v
                .generate_commentary(CommentaryContext::Thinking, &state, &mut rng)
                .is_none());
        }
    }

    #[test]
    fn test_commentary_always_with_max_sarcasm() {
        let mut v = TraitVector::standard();
        v.apply_overrides([(SARCASM, 1.0), (CHAOTIC, 1.0)]).unwrap();
        // Sarcastic mood pushes the probability to 1.0
        let mut state = EmotionalState::neutral();
        state.update(EmotionalEvent::Bug, 0.6, 2).unwrap();
        assert_eq!(v.commentary_probability(&state), 1.0);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let remark = v
                .generate_commentary(CommentaryContext::ToolFailure, &state, &mut rng)
                .unwrap();
            assert!(TOOL_FAILURE_REMARKS.contains(&remark.as_str()));
        }
    }

    #[test]
    fn test_frustration_gates_commentary() {
        let mut v = TraitVector::standard();
        v.apply_overrides([(SARCASM, 1.0), (CHAOTIC, 1.0)]).unwrap();
        let mut state = EmotionalState::neutral();
        state.update(EmotionalEvent::Failure, 0.9, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        assert!(v
            .generate_commentary(CommentaryContext::Success, &state, &mut rng)
            .is_none());
        let remarks: Vec<String> = (0..50)
            .filter_map(|_| v.generate_commentary(CommentaryContext::General, &state, &mut rng))
            .collect();
        assert!(!remarks.is_empty());
        assert!(remarks.iter().all(|r| SNARKY_REMARKS.contains(&r.as_str())));
    }

    #[test]
    fn test_chaos_injection_bounds() {
        let mut v = TraitVector::standard();
        let state = EmotionalState::neutral();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!v.should_add_chaos(0.0, &state, &mut rng));

        v.set(CHAOTIC, 1.0).unwrap();
        let mut frustrated = EmotionalState::neutral();
        frustrated.update(EmotionalEvent::Failure, 0.5, 2).unwrap();
        assert!(v.should_add_chaos(1.0, &frustrated, &mut rng));
    }
}
