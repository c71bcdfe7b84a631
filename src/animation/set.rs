use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use super::kind::AnimationKind;

/// A single frame: the path of an image on disk.
pub type Frame = PathBuf;

/// Vertical space reserved under the sprite for the caption.
pub const CAPTION_MARGIN: u32 = 20;

/// Surface size used when no frame could be measured.
pub const DEFAULT_SURFACE: (u32, u32) = (200, 200);

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Every named frame sequence the character can play.
#[derive(Debug, Clone, Default)]
pub struct AnimationSet {
    sequences: HashMap<AnimationKind, Vec<Frame>>,
}

impl AnimationSet {
    /// Loads every animation from the first base directory that has frames for it.
    ///
    /// A missing or unreadable directory produces an empty sequence.
    pub fn load<P: AsRef<Path>>(base_directories: &[P]) -> Self {
        let mut sequences = HashMap::new();
        for kind in AnimationKind::ALL {
            let frames = base_directories
                .iter()
                .map(|base| read_frames(&base.as_ref().join(kind.name())))
                .find(|frames| !frames.is_empty())
                .unwrap_or_default();
            log::debug!("Loaded {} frame(s) for '{}'", frames.len(), kind);
            sequences.insert(kind, frames);
        }
        Self::from_sequences(sequences)
    }

    /// Builds a set from already-resolved sequences, applying the usual fallbacks.
    pub fn from_sequences<I>(sequences: I) -> Self
    where
        I: IntoIterator<Item = (AnimationKind, Vec<Frame>)>,
    {
        let mut set = Self {
            sequences: sequences.into_iter().collect(),
        };
        set.resolve_fallbacks();
        set
    }

    fn resolve_fallbacks(&mut self) {
        if self.frames(AnimationKind::Nothing).is_empty() {
            if let Some(first_idle) = self.frames(AnimationKind::Idle).first().cloned() {
                self.sequences
                    .insert(AnimationKind::Nothing, vec![first_idle]);
            }
        }
        if self.frames(AnimationKind::Curse).is_empty() {
            let talking = self.frames(AnimationKind::Talking).to_vec();
            self.sequences.insert(AnimationKind::Curse, talking);
        }
    }

    fn frames(&self, kind: AnimationKind) -> &[Frame] {
        self.sequences.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Frames for `kind`. Idle falls back to the single "nothing" frame;
    /// anything else may be empty and the caller skips it.
    pub fn get(&self, kind: AnimationKind) -> &[Frame] {
        let frames = self.frames(kind);
        if frames.is_empty() && kind == AnimationKind::Idle {
            return self.frames(AnimationKind::Nothing);
        }
        frames
    }

    pub fn frame_count(&self, kind: AnimationKind) -> usize {
        self.get(kind).len()
    }

    /// True when not a single frame was found for any animation.
    pub fn is_empty(&self) -> bool {
        self.sequences.values().all(Vec::is_empty)
    }

    /// Largest frame width and height plus the caption margin.
    ///
    /// Frames whose dimensions cannot be read are logged and skipped.
    pub fn frame_bounding_box(&self) -> (u32, u32) {
        let unique: BTreeSet<&Frame> = self.sequences.values().flatten().collect();
        let mut max_width = 0;
        let mut max_height = 0;
        for frame in unique {
            match image::image_dimensions(frame) {
                Ok((width, height)) => {
                    max_width = max_width.max(width);
                    max_height = max_height.max(height);
                }
                Err(e) => log::warn!("Skipping unreadable frame {}: {}", frame.display(), e),
            }
        }
        if max_width == 0 || max_height == 0 {
            return DEFAULT_SURFACE;
        }
        (max_width, max_height + CAPTION_MARGIN)
    }
}

fn read_frames(dir: &Path) -> Vec<Frame> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            log::warn!("Cannot read animation directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut frames: Vec<Frame> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    frames.sort_by_cached_key(|path| {
        let number = frame_number(path);
        (number.is_none(), number, path.file_name().map(|n| n.to_os_string()))
    });
    frames
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Numeric value of the digits in a frame's file stem (`0007.png` -> 7).
fn frame_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits: String = stem.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}
