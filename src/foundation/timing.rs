use std::fmt;
use std::time::{Duration, Instant};

/// Wall-clock measurement of one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timing(pub Duration);

impl Timing {
    /// Run `f` and return its output together with the elapsed time.
    pub fn measure<T>(f: impl FnOnce() -> T) -> (T, Self) {
        let t0 = Instant::now();
        let out = f();
        (out, Self(t0.elapsed()))
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }

    pub fn as_millis_f64(self) -> f64 {
        self.0.as_secs_f64() * 1e3
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}ms", self.as_millis_f64())
    }
}
