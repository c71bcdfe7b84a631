use crate::animation::AnimationKind;
use crate::response::AnimationFlags;
use crate::stage::Position;

use super::turn::TurnSource;

/// Input to a running orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A question typed by the user.
    Prompt(String),
    /// Play the goodbye animation and stop.
    Shutdown,
}

/// Why the talking phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TalkEndReason {
    PlaybackFinished,
    TimedOut,
}

/// Progress notifications for front ends and tests.
#[derive(Debug, Clone, PartialEq)]
pub enum BuddyEvent {
    TurnStarted {
        turn: u64,
        user_text: Option<String>,
    },
    PromptDeferred {
        text: String,
        pending: usize,
    },
    ResponseReady {
        turn: u64,
        source: TurnSource,
        dialogue: String,
        flags: AnimationFlags,
    },
    TalkingStarted {
        turn: u64,
    },
    TalkingFinished {
        turn: u64,
        reason: TalkEndReason,
    },
    AnimationStarted {
        turn: u64,
        animation: AnimationKind,
    },
    AnimationSkipped {
        turn: u64,
        animation: AnimationKind,
    },
    TurnCompleted {
        turn: u64,
    },
    Teleported {
        position: Position,
    },
    /// A handler failed and the orchestrator forced itself back to idle.
    Recovered {
        reason: String,
    },
    Stopped,
}
