use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::error::SpeechError;
use super::synth::SpeechSynthesizer;

/// File stem of the pre-recorded rant played when the character is dragged.
pub const DRAG_SOUND_STEM: &str = "curse_scream";

/// Content-addressed store of synthesized phrases, one file per exact text.
#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex SHA-256 of the exact phrase text.
    pub fn key_for(text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    pub fn path_for(&self, text: &str, extension: &str) -> PathBuf {
        self.dir
            .join(format!("phrase_{}.{}", Self::key_for(text), extension))
    }

    pub fn drag_sound_path(&self, extension: &str) -> PathBuf {
        self.dir.join(format!("{DRAG_SOUND_STEM}.{extension}"))
    }
}

async fn is_usable(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// A synthesizer fronted by an [`AudioCache`]: each distinct phrase is
/// synthesized at most once and reused afterwards.
#[derive(Clone)]
pub struct CachedSynthesizer {
    synth: Arc<dyn SpeechSynthesizer>,
    cache: AudioCache,
}

impl CachedSynthesizer {
    pub fn new(synth: Arc<dyn SpeechSynthesizer>, cache: AudioCache) -> Self {
        Self { synth, cache }
    }

    pub fn cache(&self) -> &AudioCache {
        &self.cache
    }

    /// Path of a playable file for `text`, synthesizing only on a cache miss.
    pub async fn fetch(&self, text: &str) -> Result<PathBuf, SpeechError> {
        let path = self.cache.path_for(text, self.synth.extension());
        self.fetch_into(text, path).await
    }

    pub(crate) async fn fetch_into(
        &self,
        text: &str,
        path: PathBuf,
    ) -> Result<PathBuf, SpeechError> {
        if is_usable(&path).await {
            log::debug!("Speech cache hit: {}", path.display());
            return Ok(path);
        }

        tokio::fs::create_dir_all(self.cache.dir()).await?;
        let partial = self.cache.dir().join(format!(
            ".{}.partial.{}",
            AudioCache::key_for(text),
            self.synth.extension()
        ));
        if let Err(e) = self.synth.synthesize(text, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        if !is_usable(&partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(SpeechError::EmptyArtifact(partial));
        }
        tokio::fs::rename(&partial, &path).await?;
        log::debug!("Cached speech at {}", path.display());
        Ok(path)
    }
}

/// Records the drag rant into its fixed-name file unless it already exists.
pub async fn prepare_drag_sound(
    synth: &CachedSynthesizer,
    rant: &str,
) -> Result<PathBuf, SpeechError> {
    let path = synth.cache.drag_sound_path(synth.synth.extension());
    synth.fetch_into(rant, path).await
}
