//! Named frame sequences and the cursor used to step through them.
//!
//! Assets live in one directory per animation name (`idle/`, `wave/`, ...)
//! holding numerically ordered image frames. Loading never fails: a missing
//! or unreadable directory simply yields an empty sequence.

mod cursor;
mod kind;
mod set;

pub use cursor::FrameCursor;
pub use kind::AnimationKind;
pub use set::{AnimationSet, Frame, CAPTION_MARGIN, DEFAULT_SURFACE};
