use super::set::Frame;

/// Steps through a frame list exactly once, forwards or backwards.
///
/// The orchestrator advances one of these per timer tick instead of chaining
/// a deferred callback per frame.
#[derive(Debug, Clone)]
pub struct FrameCursor {
    frames: Vec<Frame>,
    position: usize,
    reverse: bool,
}

impl FrameCursor {
    pub fn forward(frames: &[Frame]) -> Self {
        Self {
            frames: frames.to_vec(),
            position: 0,
            reverse: false,
        }
    }

    pub fn reverse(frames: &[Frame]) -> Self {
        Self {
            frames: frames.to_vec(),
            position: 0,
            reverse: true,
        }
    }

    /// Next frame to show, or `None` once every frame has been yielded.
    pub fn next_frame(&mut self) -> Option<&Frame> {
        if self.position >= self.frames.len() {
            return None;
        }
        let index = if self.reverse {
            self.frames.len() - 1 - self.position
        } else {
            self.position
        };
        self.position += 1;
        self.frames.get(index)
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.frames.len()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
