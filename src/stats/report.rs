use std::fmt;

use crate::stats::record::StatsRecord;

type Extract = fn(&StatsRecord) -> Option<f64>;

// (field, display label, extractor in display units)
const FIELDS: [(&str, &str, Extract); 7] = [
    ("compute_time", "compute (ms)", |r| {
        r.compute_time.map(|d| d.as_secs_f64() * 1e3)
    }),
    ("encode_time", "compress (ms)", |r| {
        r.encode_time.map(|d| d.as_secs_f64() * 1e3)
    }),
    ("decode_time", "uncompress (ms)", |r| {
        r.decode_time.map(|d| d.as_secs_f64() * 1e3)
    }),
    ("render_time", "building (s)", |r| {
        r.render_time.map(|d| d.as_secs_f64())
    }),
    ("save_time", "saving (s)", |r| r.save_time.map(|d| d.as_secs_f64())),
    ("raw_size", "uncompressed (Mo)", |r| {
        r.raw_size.map(|b| b as f64 / 1e6)
    }),
    ("compressed_size", "compressed (Mo)", |r| {
        r.compressed_size.map(|b| b as f64 / 1e6)
    }),
];

/// count/mean/std/min/max of one field over all records that know it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FieldSummary {
    pub field: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); needs at least two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldSummary {
    fn from_values(field: &'static str, label: &'static str, values: &[f64]) -> Self {
        let count = values.len();
        if count == 0 {
            return Self {
                field,
                label,
                count,
                mean: None,
                std: None,
                min: None,
                max: None,
            };
        }
        let n = count as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (count > 1).then(|| {
            let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (n - 1.0)).sqrt()
        });
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            field,
            label,
            count,
            mean: Some(mean),
            std,
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Tabular summary of a run's measurements. Used for observability only.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct StatsReport {
    /// Number of records summarized.
    pub rows: usize,
    pub fields: Vec<FieldSummary>,
}

impl StatsReport {
    pub(crate) fn from_records<'a>(records: impl Iterator<Item = &'a StatsRecord>) -> Self {
        let records = records.collect::<Vec<_>>();
        let fields = FIELDS
            .iter()
            .map(|(field, label, extract)| {
                let values = records.iter().filter_map(|r| extract(r)).collect::<Vec<_>>();
                FieldSummary::from_values(field, label, &values)
            })
            .collect();
        Self {
            rows: records.len(),
            fields,
        }
    }

    /// Look up a field by its record name (e.g. `"raw_size"`).
    pub fn field(&self, field: &str) -> Option<&FieldSummary> {
        self.fields.iter().find(|f| f.field == field)
    }
}

fn cell(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:>11.4}"),
        None => format!("{:>11}", "NaN"),
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<18} {:>6} {:>11} {:>11} {:>11} {:>11}",
            "", "count", "mean", "std", "min", "max"
        )?;
        for s in &self.fields {
            writeln!(
                f,
                "{:<18} {:>6} {} {} {} {}",
                s.label,
                s.count,
                cell(s.mean),
                cell(s.std),
                cell(s.min),
                cell(s.max)
            )?;
        }
        Ok(())
    }
}
