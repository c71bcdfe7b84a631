use serde::{Deserialize, Serialize};

/// Token accounting reported alongside a reply, when the provider sends it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    #[serde(default, alias = "input_tokens")]
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    #[serde(default, alias = "output_tokens")]
    pub completion_tokens: u32,
    /// Total number of tokens used; Anthropic omits it
    #[serde(default)]
    pub total_tokens: u32,
}

impl Usage {
    /// Total tokens, computed from the parts when the provider left it out.
    pub fn total(&self) -> u32 {
        if self.total_tokens > 0 {
            self.total_tokens
        } else {
            self.prompt_tokens + self.completion_tokens
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Usage;

    #[test]
    fn anthropic_usage_shape_deserializes() {
        let usage: Usage =
            serde_json::from_str(r#"{"input_tokens": 12, "output_tokens": 30}"#).expect("usage");
        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.completion_tokens, 30);
        assert_eq!(usage.total(), 42);
    }
}
