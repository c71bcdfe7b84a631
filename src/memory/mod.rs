pub mod sliding_window;

pub use sliding_window::{SlidingWindowMemory, WindowSize};

/// Rolling conversation context handed to the assistant on every call.
pub type ConversationHistory = SlidingWindowMemory;
