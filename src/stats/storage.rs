use std::collections::BTreeMap;

use crate::stats::record::StatsRecord;
use crate::stats::report::StatsReport;

/// Image name -> merged [`StatsRecord`] for one run.
///
/// Only the controller thread writes to the storage, during submission and harvesting.
#[derive(Clone, Debug, Default)]
pub struct StatsStorage {
    data: BTreeMap<String, StatsRecord>,
}

impl StatsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `stat`, or merge it into the existing entry for the same image name.
    ///
    /// Records without an image name cannot be keyed and are dropped.
    pub fn record(&mut self, stat: StatsRecord) {
        let Some(name) = stat.image_name.clone() else {
            tracing::warn!("dropping stats record without an image name: {stat}");
            return;
        };
        match self.data.get_mut(&name) {
            Some(existing) => existing.absorb(&stat),
            None => {
                self.data.insert(name, stat);
            }
        }
    }

    pub fn get(&self, image_name: &str) -> Option<&StatsRecord> {
        self.data.get(image_name)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &StatsRecord> {
        self.data.values()
    }

    /// Numeric summary of every measured field, image names excluded.
    pub fn report(&self) -> StatsReport {
        StatsReport::from_records(self.data.values())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stats/storage.rs"]
mod tests;
