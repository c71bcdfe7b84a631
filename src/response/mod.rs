//! Turning raw assistant text into a line of dialogue and animation flags.

mod flags;
mod parser;

pub use flags::{AnimationFlags, FallbackOdds};
pub use parser::{parse, strip_markup, ParsedResponse};
