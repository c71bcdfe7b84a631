use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::flags::AnimationFlags;

/// Result of parsing one raw reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// Text to speak and caption. Only empty when the raw reply was empty.
    pub dialogue: String,
    /// Flags from the embedded JSON object, `None` when the reply had none.
    pub flags: Option<AnimationFlags>,
}

impl ParsedResponse {
    pub fn had_json(&self) -> bool {
        self.flags.is_some()
    }
}

fn braced_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*?\}").expect("braced span pattern is valid"))
}

fn emphasis_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*.*?\*").expect("emphasis pattern is valid"))
}

/// Extracts dialogue and animation flags from a raw assistant reply.
///
/// Accepts a clean JSON object, JSON trailing or embedded in prose, and plain
/// prose. Never fails: malformed JSON degrades to best-effort text.
pub fn parse(raw: &str) -> ParsedResponse {
    match locate_object(raw) {
        Some((object, span)) => {
            let dialogue = match object.get("dialogue").and_then(Value::as_str) {
                Some(text) => text.trim().to_string(),
                None => {
                    let mut rest = String::with_capacity(raw.len());
                    rest.push_str(&raw[..span.start]);
                    rest.push_str(&raw[span.end..]);
                    clean_dialogue(rest.trim())
                }
            };
            ParsedResponse {
                dialogue: if dialogue.is_empty() {
                    raw.to_string()
                } else {
                    dialogue
                },
                flags: Some(AnimationFlags::from_json(&object)),
            }
        }
        None => ParsedResponse {
            dialogue: clean_dialogue(raw),
            flags: None,
        },
    }
}

/// Removes `{...}` blocks and `*...*` emphasis, trimming what is left.
///
/// Text with nothing to strip is returned borrowed and untouched.
pub fn strip_markup(text: &str) -> Cow<'_, str> {
    if !braced_span().is_match(text) && !emphasis_span().is_match(text) {
        return Cow::Borrowed(text);
    }
    let without_json = braced_span().replace_all(text, "");
    let cleaned = emphasis_span().replace_all(&without_json, "");
    Cow::Owned(cleaned.trim().to_string())
}

/// Strips markup, keeping the original text if stripping would empty it.
fn clean_dialogue(text: &str) -> String {
    match strip_markup(text) {
        Cow::Borrowed(untouched) => untouched.to_string(),
        Cow::Owned(stripped) if stripped.is_empty() => text.to_string(),
        Cow::Owned(stripped) => stripped,
    }
}

fn locate_object(raw: &str) -> Option<(Map<String, Value>, Range<usize>)> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(trimmed) {
            let start = raw.len() - raw.trim_start().len();
            return Some((object, start..start + trimmed.len()));
        }
    }

    let mut search_from = 0;
    while let Some(offset) = raw[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_end(raw, start) {
            let candidate = &raw[start..end];
            if candidate.contains("\"dialogue\"") {
                if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(candidate) {
                    return Some((object, start..end));
                }
            }
        }
        search_from = start + 1;
    }
    None
}

/// Byte index just past the brace closing the one at `start`, honoring
/// JSON string literals and escapes.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn flags(wave: bool, backflip: bool, glasses: bool, goodbye: bool) -> Option<AnimationFlags> {
        Some(AnimationFlags {
            wave,
            backflip,
            glasses,
            goodbye,
        })
    }

    #[rstest]
    #[case::clean_json(
        r#"{"dialogue": "Sure, genius.", "wave": true, "backflip": false, "glasses": false, "goodbye": false}"#,
        "Sure, genius.",
        flags(true, false, false, false)
    )]
    #[case::json_after_prose(
        r#"Here you go. {"dialogue": "Sky's blue, duh.", "glasses": true}"#,
        "Sky's blue, duh.",
        flags(false, false, true, false)
    )]
    #[case::json_inside_prose(
        r#"Ugh. {"dialogue": "Fine.", "goodbye": true} Happy now?"#,
        "Fine.",
        flags(false, false, false, true)
    )]
    #[case::braces_inside_strings(
        r#"ok {"dialogue": "close } early \"quoted\"", "wave": true}"#,
        r#"close } early "quoted""#,
        flags(true, false, false, false)
    )]
    #[case::asterisks_in_dialogue_kept(
        r#"Sure! {"dialogue": "2 * 3 * 4 is 24", "wave": true}"#,
        "2 * 3 * 4 is 24",
        flags(true, false, false, false)
    )]
    #[case::braces_in_dialogue_kept(
        r#"{"dialogue": "Write it as {x, y}."}"#,
        "Write it as {x, y}.",
        flags(false, false, false, false)
    )]
    #[case::no_json("Just talking, no structure.", "Just talking, no structure.", None)]
    #[case::emphasis_only("*sigh* Fine, I'll help.", "Fine, I'll help.", None)]
    #[case::malformed_json(
        r#"Answer: {"dialogue": "broken", "wave": tru"#,
        r#"Answer: {"dialogue": "broken", "wave": tru"#,
        None
    )]
    #[case::markup_only("*sigh*", "*sigh*", None)]
    fn parses_reply_shapes(
        #[case] raw: &str,
        #[case] dialogue: &str,
        #[case] expected: Option<AnimationFlags>,
    ) {
        let parsed = parse(raw);
        assert_eq!(parsed.dialogue, dialogue);
        assert_eq!(parsed.flags, expected);
    }

    #[test]
    fn object_without_dialogue_keeps_surrounding_prose() {
        let parsed = parse(r#"{"wave": true, "backflip": true}"#);
        assert_eq!(parsed.flags, flags(true, true, false, false));
        assert_eq!(parsed.dialogue, r#"{"wave": true, "backflip": true}"#);

        let parsed = parse(r#"You again? {"dialogue": 5, "wave": true}"#);
        assert_eq!(parsed.dialogue, "You again?");
        assert_eq!(parsed.flags, flags(true, false, false, false));

        let parsed = parse(r#"*yawns* Whatever. {"wave": true}"#);
        assert_eq!(parsed.dialogue, "Whatever.");
    }

    #[test]
    fn empty_input_yields_empty_dialogue() {
        let parsed = parse("");
        assert_eq!(parsed.dialogue, "");
        assert!(!parsed.had_json());
    }

    #[test]
    fn strip_markup_borrows_clean_text() {
        assert!(matches!(strip_markup("plain words"), Cow::Borrowed(_)));
        assert_eq!(strip_markup("hi {\"a\":1} *wink* there"), "hi   there");
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_text(raw in "\\PC{0,200}") {
            let _ = parse(&raw);
        }

        #[test]
        fn brace_free_text_is_returned_unchanged(raw in "[a-zA-Z0-9 .,!?']{0,80}") {
            let parsed = parse(&raw);
            prop_assert_eq!(parsed.dialogue, raw);
            prop_assert!(parsed.flags.is_none());
        }

        #[test]
        fn parsing_is_idempotent_without_json(raw in "[a-z {}*\":,]{0,60}") {
            let once = parse(&raw);
            if once.flags.is_none() {
                let twice = parse(&once.dialogue);
                prop_assert_eq!(twice.dialogue, once.dialogue);
            }
        }
    }
}
