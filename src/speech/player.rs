use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use super::error::SpeechError;
use super::synth::check_output;

/// Plays an audio file, resolving once playback has finished.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, path: &Path) -> Result<(), SpeechError>;
}

/// Plays through an external program such as `afplay` or `aplay -q`.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    /// Parses a command line with shell quoting rules; the file path is
    /// appended as the final argument at play time.
    pub fn from_command_line(command_line: &str) -> Result<Self, SpeechError> {
        let mut words = shell_words::split(command_line)
            .map_err(|e| SpeechError::InvalidCommand(e.to_string()))?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| SpeechError::InvalidCommand("empty player command".to_string()))?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, path: &Path) -> Result<(), SpeechError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .output()
            .await?;
        check_output(&self.program, output)
    }
}

/// In-process playback on the default output device.
#[cfg(feature = "rodio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RodioPlayer;

#[cfg(feature = "rodio")]
#[async_trait]
impl AudioPlayer for RodioPlayer {
    async fn play(&self, path: &Path) -> Result<(), SpeechError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || -> Result<(), SpeechError> {
            let (_stream, handle) = rodio::OutputStream::try_default()
                .map_err(|e| SpeechError::Playback(e.to_string()))?;
            let sink =
                rodio::Sink::try_new(&handle).map_err(|e| SpeechError::Playback(e.to_string()))?;
            let file = std::fs::File::open(&path)?;
            let source = rodio::Decoder::new(std::io::BufReader::new(file))
                .map_err(|e| SpeechError::Playback(e.to_string()))?;
            sink.append(source);
            sink.sleep_until_end();
            Ok(())
        })
        .await
        .map_err(|e| SpeechError::Playback(e.to_string()))?
    }
}
