use crate::foundation::core::{FrameBound, FrameIndex};
use crate::foundation::error::{AnimError, AnimResult};
use crate::frame::model::Frame;

/// Lazy sequence of frames returned by a compute callback.
pub type FrameIter = Box<dyn Iterator<Item = Frame>>;

/// Zero-argument compute callback. Every call restarts the sequence from the first frame.
pub type ComputeFn = Box<dyn Fn() -> FrameIter>;

/// Wraps a compute callback (or a frame count alone) into a lazy, optionally bounded frame
/// sequence.
pub struct FrameSource {
    bound: FrameBound,
    compute: Option<ComputeFn>,
}

impl std::fmt::Debug for FrameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSource")
            .field("bound", &self.bound)
            .field("compute", &self.compute.is_some())
            .finish()
    }
}

impl FrameSource {
    /// Build a source from an optional frame count and an optional compute callback.
    ///
    /// With only a callback the source is unbounded; with only a count it yields that many empty
    /// frames. A count of `0` is treated as absent.
    pub fn new(max_frames: Option<u64>, compute: Option<ComputeFn>) -> AnimResult<Self> {
        let bound = FrameBound::from_max_frames(max_frames);
        if compute.is_none() && bound == FrameBound::Unbounded {
            return Err(AnimError::config(
                "either max_frames or a compute function must be provided",
            ));
        }
        Ok(Self { bound, compute })
    }

    /// Source yielding `n` empty frames.
    pub fn count(n: u64) -> AnimResult<Self> {
        Self::new(Some(n), None)
    }

    /// Unbounded source driven by `compute`.
    pub fn from_compute<F, I>(compute: F) -> Self
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = Frame>,
        I::IntoIter: 'static,
    {
        Self {
            bound: FrameBound::Unbounded,
            compute: Some(Box::new(move || Box::new(compute().into_iter()))),
        }
    }

    /// Cap the number of produced frames. `0` removes the cap.
    pub fn with_max_frames(mut self, max_frames: u64) -> Self {
        self.bound = FrameBound::from_max_frames(Some(max_frames));
        self
    }

    pub fn bound(&self) -> FrameBound {
        self.bound
    }

    /// Start a fresh pass over the frames.
    ///
    /// The returned iterator is not restartable and stops at whichever comes first: the bound or
    /// the callback's exhaustion. An unbounded source over a never-ending callback never stops.
    pub fn frames(&self) -> Frames {
        let inner: FrameIter = match &self.compute {
            Some(compute) => compute(),
            None => Box::new(std::iter::repeat_with(Frame::empty)),
        };
        Frames {
            inner,
            bound: self.bound,
            produced: 0,
        }
    }
}

/// Single pass over a [`FrameSource`], tagging each frame with its production index.
pub struct Frames {
    inner: FrameIter,
    bound: FrameBound,
    produced: u64,
}

impl Iterator for Frames {
    type Item = (FrameIndex, Frame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.bound.is_reached(self.produced) {
            return None;
        }
        let frame = self.inner.next()?;
        let idx = FrameIndex(self.produced);
        self.produced += 1;
        Some((idx, frame))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/source.rs"]
mod tests;
