use std::collections::BTreeMap;
use std::io::{Read as _, Write as _};
use std::time::Duration;

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::foundation::error::{AnimError, AnimResult};
use crate::foundation::timing::Timing;
use crate::frame::model::{AttrValue, Frame, Variable};
use crate::stats::record::StatsRecord;

/// Frames larger than this are compressed before crossing the worker boundary.
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 1_000_000;

/// Maximum number of values per compressed chunk.
pub const CHUNK_ELEMS: usize = 64 * 1024;

/// On-wire representation of a [`Frame`] handed to a worker.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// The frame itself, unchanged.
    Raw(Frame),
    /// Chunked, deflate-compressed serialization of the frame.
    Compressed(CompressedFrame),
}

impl Payload {
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Compressed(_))
    }
}

/// Compressed dataset: metadata stays plain, variable values are stored as independently
/// compressed chunks of at most [`CHUNK_ELEMS`] values.
#[derive(Clone, Debug, PartialEq)]
pub struct CompressedFrame {
    variables: BTreeMap<String, CompressedVariable>,
    coords: BTreeMap<String, CompressedVariable>,
    attrs: BTreeMap<String, AttrValue>,
}

impl CompressedFrame {
    /// Total bytes stored across all chunks.
    pub fn stored_bytes(&self) -> u64 {
        self.variables
            .values()
            .chain(self.coords.values())
            .map(CompressedVariable::stored_bytes)
            .sum()
    }

    pub fn chunk_count(&self) -> usize {
        self.variables
            .values()
            .chain(self.coords.values())
            .map(|v| v.chunks.len())
            .sum()
    }
}

#[derive(Clone, Debug, PartialEq)]
struct CompressedVariable {
    dims: Vec<String>,
    shape: Vec<usize>,
    len: usize,
    chunks: Vec<Vec<u8>>,
}

impl CompressedVariable {
    fn compress(var: &Variable) -> AnimResult<Self> {
        let mut chunks = Vec::with_capacity(var.data.len().div_ceil(CHUNK_ELEMS));
        for values in var.data.chunks(CHUNK_ELEMS) {
            let mut enc = DeflateEncoder::new(
                Vec::with_capacity(values.len() * 2),
                Compression::default(),
            );
            for v in values {
                enc.write_all(&v.to_le_bytes())
                    .map_err(|e| AnimError::codec(format!("chunk compression failed: {e}")))?;
            }
            chunks.push(
                enc.finish()
                    .map_err(|e| AnimError::codec(format!("chunk compression failed: {e}")))?,
            );
        }
        Ok(Self {
            dims: var.dims.clone(),
            shape: var.shape.clone(),
            len: var.data.len(),
            chunks,
        })
    }

    fn decompress(&self) -> AnimResult<Variable> {
        let mut data = Vec::with_capacity(self.len);
        let mut buf = Vec::new();
        for chunk in &self.chunks {
            buf.clear();
            DeflateDecoder::new(chunk.as_slice())
                .read_to_end(&mut buf)
                .map_err(|e| AnimError::codec(format!("chunk decompression failed: {e}")))?;
            if !buf.len().is_multiple_of(8) {
                return Err(AnimError::codec("decompressed chunk is not a whole number of f64"));
            }
            data.extend(buf.chunks_exact(8).map(|b| {
                let mut le = [0u8; 8];
                le.copy_from_slice(b);
                f64::from_le_bytes(le)
            }));
        }
        if data.len() != self.len {
            return Err(AnimError::codec(format!(
                "decompressed {} values, expected {}",
                data.len(),
                self.len
            )));
        }
        Variable::new(self.dims.clone(), self.shape.clone(), data)
            .map_err(|e| AnimError::codec(e.to_string()))
    }

    fn stored_bytes(&self) -> u64 {
        self.chunks.iter().map(|c| c.len() as u64).sum()
    }
}

fn compress_map(
    vars: &BTreeMap<String, Variable>,
) -> AnimResult<BTreeMap<String, CompressedVariable>> {
    vars.iter()
        .map(|(k, v)| Ok((k.clone(), CompressedVariable::compress(v)?)))
        .collect()
}

fn decompress_map(
    vars: &BTreeMap<String, CompressedVariable>,
) -> AnimResult<BTreeMap<String, Variable>> {
    vars.iter()
        .map(|(k, v)| Ok((k.clone(), v.decompress()?)))
        .collect()
}

#[cfg(test)]
impl CompressedFrame {
    /// Overwrite the first stored chunk of variable `name` with bytes that are not deflate data.
    pub(crate) fn corrupt_first_chunk(&mut self, name: &str) {
        if let Some(chunk) = self
            .variables
            .get_mut(name)
            .and_then(|v| v.chunks.first_mut())
        {
            *chunk = vec![0xff, 0x00, 0x13];
        }
    }
}

/// Wrap `frame` for transfer, compressing it when it exceeds `threshold_bytes`.
///
/// The partial stats carry `raw_size`, plus `compressed_size` and `encode_time` when compressed.
pub fn encode(frame: Frame, threshold_bytes: u64) -> AnimResult<(Payload, StatsRecord)> {
    let raw_size = frame.byte_size();
    let mut stats = StatsRecord {
        raw_size: Some(raw_size),
        ..StatsRecord::default()
    };
    if raw_size <= threshold_bytes {
        return Ok((Payload::Raw(frame), stats));
    }

    let (compressed, timing) = Timing::measure(|| -> AnimResult<CompressedFrame> {
        Ok(CompressedFrame {
            variables: compress_map(&frame.variables)?,
            coords: compress_map(&frame.coords)?,
            attrs: frame.attrs.clone(),
        })
    });
    let compressed = compressed?;
    stats.compressed_size = Some(compressed.stored_bytes());
    stats.encode_time = Some(timing.as_duration());
    Ok((Payload::Compressed(compressed), stats))
}

/// Materialize the frame carried by `payload`.
///
/// Raw payloads are passed through with a zero `decode_time`.
pub fn decode(payload: Payload) -> AnimResult<(Frame, StatsRecord)> {
    match payload {
        Payload::Raw(frame) => Ok((
            frame,
            StatsRecord {
                decode_time: Some(Duration::ZERO),
                ..StatsRecord::default()
            },
        )),
        Payload::Compressed(c) => {
            let (frame, timing) = Timing::measure(|| -> AnimResult<Frame> {
                Ok(Frame {
                    variables: decompress_map(&c.variables)?,
                    coords: decompress_map(&c.coords)?,
                    attrs: c.attrs.clone(),
                })
            });
            Ok((
                frame?,
                StatsRecord {
                    decode_time: Some(timing.as_duration()),
                    ..StatsRecord::default()
                },
            ))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/payload.rs"]
mod tests;
