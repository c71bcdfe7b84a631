//! The turn state machine that drives the character.
//!
//! One [`Orchestrator`] task owns all presentation state. Frame ticks,
//! teleport and chatter timers, user commands, and results from the spawned
//! remote-call and speech tasks are multiplexed in a single `select!` loop.

mod config;
mod events;
mod orchestrator;
mod state;
mod turn;

pub use config::OrchestratorConfig;
pub use events::{BuddyEvent, Command, TalkEndReason};
pub use orchestrator::Orchestrator;
pub use state::{Phase, PresentationState, TeleportLeg};
pub use turn::{resolve_reply, speech_timeout, AssistantTurn, TurnSource};
