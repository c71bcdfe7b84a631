use std::ffi::OsString;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::process::Command;

use super::error::SpeechError;

/// Turns text into an audio file at `dest`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), SpeechError>;

    /// File extension of the audio this synthesizer writes.
    fn extension(&self) -> &str;
}

/// Local system speech (`say -v <voice> -o <file> <text>` on macOS).
#[derive(Debug, Clone)]
pub struct SystemTts {
    program: String,
    voice: String,
}

impl SystemTts {
    pub fn new(voice: impl Into<String>) -> Self {
        Self::with_program("say", voice)
    }

    pub fn with_program(program: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            voice: voice.into(),
        }
    }
}

/// A leading dash would be read as an option by most speech tools.
pub(crate) fn text_argument(text: &str) -> OsString {
    if text.starts_with('-') {
        OsString::from(format!(" {text}"))
    } else {
        OsString::from(text)
    }
}

pub(crate) fn check_output(program: &str, output: Output) -> Result<(), SpeechError> {
    if output.status.success() {
        return Ok(());
    }
    Err(SpeechError::Command {
        program: program.to_string(),
        status: output.status.to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    })
}

#[async_trait]
impl SpeechSynthesizer for SystemTts {
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), SpeechError> {
        log::debug!("{} -v {} -o {}", self.program, self.voice, dest.display());
        let output = Command::new(&self.program)
            .arg("-v")
            .arg(&self.voice)
            .arg("-o")
            .arg(dest)
            .arg(text_argument(text))
            .output()
            .await?;
        check_output(&self.program, output)
    }

    fn extension(&self) -> &str {
        "aiff"
    }
}

/// HTTP text-to-speech service answering `GET ?text=&voice=&pitch=&speed=`
/// with a WAV body.
#[derive(Debug, Clone)]
pub struct RemoteTts {
    client: Client,
    url: String,
    voice: String,
    pitch: String,
    speed: String,
}

impl RemoteTts {
    pub fn new(
        url: impl Into<String>,
        voice: impl Into<String>,
        pitch: impl Into<String>,
        speed: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SpeechError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            voice: voice.into(),
            pitch: pitch.into(),
            speed: speed.into(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for RemoteTts {
    async fn synthesize(&self, text: &str, dest: &Path) -> Result<(), SpeechError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("text", text),
                ("voice", self.voice.as_str()),
                ("pitch", self.pitch.as_str()),
                ("speed", self.speed.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let audio = response.bytes().await?;
        tokio::fs::write(dest, &audio).await?;
        Ok(())
    }

    fn extension(&self) -> &str {
        "wav"
    }
}
