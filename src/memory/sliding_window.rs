use std::{collections::VecDeque, num::NonZeroUsize};

use crate::{
    chat::{ChatMessage, ChatRole},
    error::AssistantError,
};

/// Non-zero window size for sliding memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize(NonZeroUsize);

impl WindowSize {
    pub fn get(self) -> usize {
        self.0.get()
    }

    fn fallback() -> Self {
        Self(NonZeroUsize::MIN)
    }
}

impl TryFrom<usize> for WindowSize {
    type Error = AssistantError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        let Some(size) = NonZeroUsize::new(value) else {
            return Err(AssistantError::InvalidRequest(
                "Window size must be greater than 0".to_string(),
            ));
        };
        Ok(Self(size))
    }
}

/// Sliding window memory that keeps the N most recent messages, oldest
/// evicted first.
#[derive(Debug, Clone)]
pub struct SlidingWindowMemory {
    messages: VecDeque<ChatMessage>,
    window_size: WindowSize,
}

impl SlidingWindowMemory {
    /// Create a new sliding window memory with the specified window size.
    pub fn new(window_size: usize) -> Self {
        Self::with_window_size(normalize_window_size(window_size))
    }

    /// Create a new sliding window memory with validation.
    pub fn try_new(window_size: usize) -> Result<Self, AssistantError> {
        let window_size = WindowSize::try_from(window_size)?;
        Ok(Self::with_window_size(window_size))
    }

    /// Window holding the last `exchanges` user/assistant pairs, at least one
    /// so the context never opens with an assistant message.
    pub fn with_exchanges(exchanges: usize) -> Self {
        Self::new(exchanges.max(1).saturating_mul(2))
    }

    fn with_window_size(window_size: WindowSize) -> Self {
        Self {
            messages: VecDeque::with_capacity(window_size.get()),
            window_size,
        }
    }

    /// Get the configured window size.
    pub fn window_size(&self) -> usize {
        self.window_size.get()
    }

    pub fn remember(&mut self, message: ChatMessage) {
        while self.messages.len() >= self.window_size.get() {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Records one completed exchange.
    pub fn remember_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.remember(ChatMessage::user().content(user).build());
        self.remember(ChatMessage::assistant().content(assistant).build());
    }

    /// Get all stored messages in chronological order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    /// Get the most recent N messages.
    pub fn recent_messages(&self, limit: usize) -> Vec<ChatMessage> {
        let len = self.messages.len();
        let start = len.saturating_sub(limit);
        self.messages.range(start..).cloned().collect()
    }

    /// Stored history followed by a new user message, ready to send.
    pub fn with_user_message(&self, text: &str) -> Vec<ChatMessage> {
        let mut messages = self.messages();
        messages.push(ChatMessage::user().content(text).build());
        messages
    }

    pub fn last_role(&self) -> Option<ChatRole> {
        self.messages.back().map(|msg| msg.role)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

fn normalize_window_size(window_size: usize) -> WindowSize {
    match WindowSize::try_from(window_size) {
        Ok(size) => size,
        Err(err) => {
            log::warn!("Invalid window size: {err}");
            WindowSize::fallback()
        }
    }
}
