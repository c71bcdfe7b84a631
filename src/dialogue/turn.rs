use std::time::Duration;

use rand::Rng;

use crate::error::AssistantError;
use crate::persona::{offline_response, CONFUSED_LINE};
use crate::response::{parse, AnimationFlags, FallbackOdds};

/// Where a turn's dialogue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSource {
    /// Parsed from an assistant reply.
    Remote,
    /// A canned line spoken without asking the assistant.
    Offline,
    /// A canned line standing in for a failed request.
    ErrorFallback,
}

/// One thing the character is about to say and do.
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantTurn {
    /// `None` for lines the character says unprompted.
    pub user_text: Option<String>,
    pub dialogue: String,
    pub flags: AnimationFlags,
    pub source: TurnSource,
}

impl AssistantTurn {
    pub fn canned(user_text: Option<String>, line: &str, source: TurnSource) -> Self {
        Self {
            user_text,
            dialogue: line.to_string(),
            flags: AnimationFlags::default(),
            source,
        }
    }
}

/// Turns the outcome of a remote call into a turn.
///
/// Any failure becomes a random offline line with no animations. A reply
/// without JSON is decorated with random flags when `fallback` is given, and
/// a reply with nothing to say becomes the confused line.
pub fn resolve_reply<R: Rng + ?Sized>(
    user_text: Option<String>,
    reply: &Result<String, AssistantError>,
    fallback: Option<&FallbackOdds>,
    rng: &mut R,
) -> AssistantTurn {
    let raw = match reply {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Assistant request failed: {e}");
            return AssistantTurn::canned(
                user_text,
                offline_response(rng),
                TurnSource::ErrorFallback,
            );
        }
    };

    let parsed = parse(raw);
    let flags = match (parsed.flags, fallback) {
        (Some(flags), _) => flags,
        (None, Some(odds)) => AnimationFlags::roll(rng, odds),
        (None, None) => AnimationFlags::default(),
    };
    let dialogue = if parsed.dialogue.trim().is_empty() {
        CONFUSED_LINE.to_string()
    } else {
        parsed.dialogue
    };

    AssistantTurn {
        user_text,
        dialogue,
        flags,
        source: TurnSource::Remote,
    }
}

/// How long talking may last when playback never reports completion:
/// `words × ms_per_word`, but never less than `min`.
pub fn speech_timeout(text: &str, ms_per_word: u64, min: Duration) -> Duration {
    let words = text.split_whitespace().count() as u64;
    Duration::from_millis(words.saturating_mul(ms_per_word)).max(min)
}
