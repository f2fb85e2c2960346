use std::fmt;

use crate::foundation::error::{AnimError, AnimResult};

/// Position of a frame in production order (0-based).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upper bound on the number of frames a run produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameBound {
    /// Exactly this many frames at most.
    Limited(u64),
    /// Keep going until the frame source is exhausted.
    #[default]
    Unbounded,
}

impl FrameBound {
    /// `None` and `Some(0)` both mean "no known bound".
    pub fn from_max_frames(max_frames: Option<u64>) -> Self {
        match max_frames {
            Some(n) if n > 0 => Self::Limited(n),
            _ => Self::Unbounded,
        }
    }

    /// `true` once `produced` frames satisfy the bound.
    pub fn is_reached(self, produced: u64) -> bool {
        matches!(self, Self::Limited(n) if produced >= n)
    }
}

impl fmt::Display for FrameBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unbounded => f.write_str("???"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> AnimResult<Self> {
        if den == 0 {
            return Err(AnimError::config("fps den must be > 0"));
        }
        if num == 0 {
            return Err(AnimError::config("fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn integer(num: u32) -> AnimResult<Self> {
        Self::new(num, 1)
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }
}

impl fmt::Display for Fps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
