use std::borrow::Cow;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use crate::response::strip_markup;

use super::cache::CachedSynthesizer;
use super::error::SpeechError;
use super::player::AudioPlayer;
use super::synth::text_argument;

/// How a `speak` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// The audio played to the end.
    Finished,
    /// Speech was handed off without a completion signal; the caller's
    /// timeout decides when talking is over.
    Detached,
}

/// Anything that can say a line out loud.
#[async_trait]
pub trait Voice: Send + Sync {
    async fn speak(&self, text: &str) -> Result<Playback, SpeechError>;
}

/// Text as it should be spoken: markup removed, falling back to the trimmed
/// original when nothing else is left.
pub fn speech_text(text: &str) -> Cow<'_, str> {
    match strip_markup(text) {
        Cow::Owned(stripped) if stripped.is_empty() => Cow::Borrowed(text.trim()),
        other => other,
    }
}

/// Synthesize-or-reuse, then play. When synthesis fails the line is spoken
/// directly by the system speech command instead.
pub struct SpeechPipeline {
    synth: CachedSynthesizer,
    player: Arc<dyn AudioPlayer>,
    direct_command: Option<String>,
}

impl SpeechPipeline {
    pub fn new(synth: CachedSynthesizer, player: Arc<dyn AudioPlayer>) -> Self {
        Self {
            synth,
            player,
            direct_command: Some("say".to_string()),
        }
    }

    /// Program used for direct speech, or `None` to disable that fallback.
    pub fn with_direct_command(mut self, program: Option<String>) -> Self {
        self.direct_command = program;
        self
    }

    pub fn synthesizer(&self) -> &CachedSynthesizer {
        &self.synth
    }

    fn speak_directly(&self, text: &str) -> Result<Playback, SpeechError> {
        let Some(program) = &self.direct_command else {
            return Ok(Playback::Detached);
        };
        let mut child = Command::new(program)
            .arg(text_argument(text))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let program = program.clone();
        tokio::spawn(async move {
            if let Err(e) = child.wait().await {
                log::debug!("Direct speech via {program} failed: {e}");
            }
        });
        Ok(Playback::Detached)
    }
}

#[async_trait]
impl Voice for SpeechPipeline {
    async fn speak(&self, text: &str) -> Result<Playback, SpeechError> {
        let text = speech_text(text);
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        match self.synth.fetch(&text).await {
            Ok(path) => {
                self.player.play(&path).await?;
                Ok(Playback::Finished)
            }
            Err(e) => {
                log::warn!("Speech synthesis failed, speaking directly: {e}");
                self.speak_directly(&text)
            }
        }
    }
}

/// Says nothing; talking lasts as long as the speech timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentVoice;

#[async_trait]
impl Voice for SilentVoice {
    async fn speak(&self, _text: &str) -> Result<Playback, SpeechError> {
        Ok(Playback::Detached)
    }
}
