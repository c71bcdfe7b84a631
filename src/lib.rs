//! desk-buddy: an animated desktop assistant character.
//!
//! The crate is split along the life of one turn:
//!
//! - [`chat`], [`backends`] and [`builder`] talk to the remote assistant
//! - [`response`] pulls dialogue and animation flags out of free-form replies
//! - [`speech`] turns dialogue into cached audio and plays it
//! - [`animation`] loads the sprite sequences
//! - [`dialogue`] runs the state machine that ties them together on a [`stage`]

/// Backend implementations for the supported chat APIs
pub mod backends;

/// Builder pattern for configuring and instantiating an assistant
pub mod builder;

/// Chat messages and the provider trait
pub mod chat;

/// Error types
pub mod error;

/// Bounded conversation history
pub mod memory;

/// Retry wrapper for flaky providers
pub mod resilient_assistant;

pub mod animation;
pub mod config;
pub mod dialogue;
pub mod persona;
pub mod response;
pub mod speech;
pub mod stage;

pub use builder::{assistant_from_config, AssistantBackend, AssistantBuilder};
pub use chat::{ChatMessage, ChatProvider, ChatRole};
pub use dialogue::{BuddyEvent, Command, Orchestrator, OrchestratorConfig};
pub use error::AssistantError;
