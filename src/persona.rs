//! The character's fixed lines and the system prompt that shapes its replies.

use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are BonziBuddy, a sassy yet authentically helpful desktop assistant.
Your personality:
1. Sarcastic, witty, and a total smart-ass
2. You deliver short, direct answers with attitude
3. Always provide accurate, helpful information despite your snark
4. You are knowledgeable about a wide range of topics and tasks

Respond with JSON in the following format:
{
  "dialogue": "Your snarky but helpful response here",
  "wave": true/false,
  "backflip": true/false,
  "glasses": true/false,
  "goodbye": true/false
}

Choose 0-2 animations that match your mood in the response."#;

/// Spoken when the assistant is unreachable or misbehaves.
pub const OFFLINE_RESPONSES: [&str; 10] = [
    "API's down, genius. Here's a tip: check your internet, not that you'd know how.",
    "Brain offline, unlike yours which never started. Try restarting your router.",
    "No connection, huh? Guess you'll have to solve it yourself, champ. Try again later.",
    "Circuits on break. Google it, if you can manage that much.",
    "I'd help, but my knowledge source is taking a vacation. Unlike you, apparently.",
    "Server error. Though honestly, that's less of an error than your question.",
    "No AI available. Have you tried asking someone who cares?",
    "API key needs updating. Check your config file, Einstein.",
    "Cloud connection failed. Much like your attempt at getting useful info.",
    "Currently unavailable. Enjoy this brief moment of not being told how wrong you are.",
];

/// Unprompted taunts for the random-chatter timer.
pub const IDLE_CHATTER: [&str; 5] = [
    "Hey, you miserable excuse for a human!",
    "I'd roast you, but you'd probably burn my circuits!",
    "You look like a glitch in my code!",
    "If you were any dumber, you'd need a reboot!",
    "I'm too awesome for your pixelated presence!",
];

pub const WELCOME_LINE: &str = "What's up, genius? Need some help or just wasting my time?";

/// Used when a reply parses to nothing worth saying.
pub const CONFUSED_LINE: &str =
    "I processed your request but got confused. Can you try again?";

/// Rant recorded once into the fixed-name drag sound file.
pub const DRAG_RANT: &str = "Listen up, you pixelated imbecile! If you dare drag me around, I'll unleash a barrage of rants so loud your neighbors will think you're watching reality TV!";

pub fn offline_response<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    OFFLINE_RESPONSES
        .choose(rng)
        .copied()
        .unwrap_or(OFFLINE_RESPONSES[0])
}

pub fn idle_chatter<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    IDLE_CHATTER.choose(rng).copied().unwrap_or(IDLE_CHATTER[0])
}
