//! Text-to-speech for the character: synthesis, an on-disk phrase cache,
//! and playback.
//!
//! Text is always handed to external programs as a separate argument, never
//! interpolated into a shell command line.

mod cache;
mod error;
mod player;
mod synth;
mod voice;

pub use cache::{prepare_drag_sound, AudioCache, CachedSynthesizer, DRAG_SOUND_STEM};
pub use error::SpeechError;
#[cfg(feature = "rodio")]
pub use player::RodioPlayer;
pub use player::{AudioPlayer, CommandPlayer};
pub use synth::{RemoteTts, SpeechSynthesizer, SystemTts};
pub use voice::{speech_text, Playback, SilentVoice, SpeechPipeline, Voice};
