#[path = "builder/backend.rs"]
mod backend;

#[path = "builder/assistant_builder.rs"]
mod assistant_builder;

#[path = "builder/state.rs"]
mod state;

#[path = "builder/build/mod.rs"]
mod build;

#[path = "builder/resilience.rs"]
mod resilience;

#[path = "builder/from_config.rs"]
mod from_config;

pub use assistant_builder::AssistantBuilder;
pub use backend::AssistantBackend;
pub use from_config::assistant_from_config;
