use std::collections::VecDeque;

use crate::animation::{AnimationKind, FrameCursor};

/// Where the character is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingResponse,
    Talking,
    PlayingQueuedAnimation,
    Teleporting,
}

/// Which half of a teleport is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeleportLeg {
    /// Arrive frames in reverse, before the move.
    Vanish,
    /// Arrive frames forward, after the move.
    Arrive,
}

/// Everything the orchestrator knows about what is on screen.
#[derive(Debug, Clone, Default)]
pub struct PresentationState {
    pub phase: Phase,
    /// Sequence currently shown.
    pub sequence: Option<AnimationKind>,
    /// Index into a looping sequence (idle, talking).
    pub frame_index: usize,
    pub talking: bool,
    /// Set from the moment a turn starts until it returns to idle.
    pub dialogue_active: bool,
    /// One-shot animations still to play this turn.
    pub queue: VecDeque<AnimationKind>,
    pub(crate) cursor: Option<FrameCursor>,
    pub teleport_leg: Option<TeleportLeg>,
    /// Id of the current (or last) turn; results for other ids are stale.
    pub turn: u64,
}

impl PresentationState {
    /// True when a new turn or teleport may start.
    pub fn is_free(&self) -> bool {
        self.phase == Phase::Idle && !self.dialogue_active
    }

    /// Drops every in-flight activity and returns to idle.
    pub(crate) fn reset_to_idle(&mut self) {
        self.phase = Phase::Idle;
        self.sequence = Some(AnimationKind::Idle);
        self.frame_index = 0;
        self.talking = false;
        self.dialogue_active = false;
        self.queue.clear();
        self.cursor = None;
        self.teleport_leg = None;
    }
}
