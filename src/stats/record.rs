use std::fmt;
use std::time::Duration;

/// Partial or complete timing/size measurements for one frame, keyed by image name.
///
/// Every field is independently optional: `None` means "unknown". Records are combined with
/// [`StatsRecord::merge`], where the argument wins over the receiver.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StatsRecord {
    pub image_name: Option<String>,
    pub compute_time: Option<Duration>,
    pub encode_time: Option<Duration>,
    pub decode_time: Option<Duration>,
    pub render_time: Option<Duration>,
    pub save_time: Option<Duration>,
    pub raw_size: Option<u64>,
    pub compressed_size: Option<u64>,
}

impl StatsRecord {
    /// Record with only the image name known.
    pub fn named(image_name: impl Into<String>) -> Self {
        Self {
            image_name: Some(image_name.into()),
            ..Self::default()
        }
    }

    /// Per field: `other`'s value if known, else `self`'s.
    ///
    /// Not commutative: when both sides know a field, `other` wins.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            image_name: other.image_name.clone().or_else(|| self.image_name.clone()),
            compute_time: other.compute_time.or(self.compute_time),
            encode_time: other.encode_time.or(self.encode_time),
            decode_time: other.decode_time.or(self.decode_time),
            render_time: other.render_time.or(self.render_time),
            save_time: other.save_time.or(self.save_time),
            raw_size: other.raw_size.or(self.raw_size),
            compressed_size: other.compressed_size.or(self.compressed_size),
        }
    }

    /// In-place form of [`StatsRecord::merge`].
    pub fn absorb(&mut self, other: &Self) {
        *self = self.merge(other);
    }

    /// `true` when no numeric field is known (e.g. a cache-skip record).
    pub fn has_no_measurements(&self) -> bool {
        self.compute_time.is_none()
            && self.encode_time.is_none()
            && self.decode_time.is_none()
            && self.render_time.is_none()
            && self.save_time.is_none()
            && self.raw_size.is_none()
            && self.compressed_size.is_none()
    }
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1e3
}

fn kb(bytes: u64) -> f64 {
    bytes as f64 / 1e3
}

// data=(compute=  1.20ms,size=  0.08Ko->  0.02Ko[  0.31ms])|image=(build= 10.00ms,save=  3.00ms)
impl fmt::Display for StatsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut data = Vec::new();
        if let Some(t) = self.compute_time {
            data.push(format!("compute={:6.2}ms", ms(t)));
        }

        let mut size = String::new();
        if let Some(raw) = self.raw_size {
            size.push_str(&format!("size={:6.2}Ko", kb(raw)));
        }
        if let Some(c) = self.compressed_size {
            size.push_str(&format!("->{:6.2}Ko", kb(c)));
        }
        if let Some(t) = self.encode_time {
            size.push_str(&format!("[{:6.2}ms]", ms(t)));
        }
        if !size.is_empty() {
            data.push(size);
        }
        write!(f, "data=({})", data.join(","))?;

        let mut img = Vec::new();
        if let Some(t) = self.render_time {
            img.push(format!("build={:6.2}ms", ms(t)));
        }
        if let Some(t) = self.save_time {
            img.push(format!("save={:6.2}ms", ms(t)));
        }
        if !img.is_empty() {
            write!(f, "|image=({})", img.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stats/record.rs"]
mod tests;
