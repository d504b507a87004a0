//! JPL/NAIF SPK kernel reader.
//!
//! Loads a binary SPK file (DAF container) into memory, indexes its
//! segments, and evaluates Type 2 (Chebyshev position) segments. States
//! are in km and km/s, relative to the segment center, in the segment
//! frame (J2000/ICRF for JPL DE kernels).

pub mod chebyshev;
pub mod daf;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

use daf::{Endian, word_offset};

/// Errors from kernel loading or evaluation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum KernelError {
    Io(String),
    InvalidFormat(String),
    UnsupportedType { target: i32, data_type: i32 },
    SegmentNotFound { target: i32, center: i32 },
    EpochOutOfRange {
        target: i32,
        center: i32,
        epoch_tdb_s: f64,
    },
}

impl Display for KernelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
            Self::InvalidFormat(msg) => write!(f, "invalid SPK file: {msg}"),
            Self::UnsupportedType { target, data_type } => {
                write!(
                    f,
                    "segment for body {target} has unsupported type {data_type}"
                )
            }
            Self::SegmentNotFound { target, center } => {
                write!(f, "no segment for body {target} relative to {center}")
            }
            Self::EpochOutOfRange {
                target,
                center,
                epoch_tdb_s,
            } => write!(
                f,
                "epoch {epoch_tdb_s} s TDB outside coverage of {target} relative to {center}"
            ),
        }
    }
}

impl Error for KernelError {}

impl From<std::io::Error> for KernelError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

/// Index entry for one SPK segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SpkSegment {
    pub target: i32,
    pub center: i32,
    pub frame: i32,
    pub data_type: i32,
    /// Coverage start, TDB seconds past J2000.
    pub start_epoch: f64,
    /// Coverage end, TDB seconds past J2000.
    pub end_epoch: f64,
    start_address: usize,
    end_address: usize,
    layout: Option<Type2Layout>,
}

impl SpkSegment {
    pub fn covers(&self, epoch_tdb_s: f64) -> bool {
        (self.start_epoch..=self.end_epoch).contains(&epoch_tdb_s)
    }
}

/// Directory stored in the last four words of a Type 2 segment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Type2Layout {
    init: f64,
    interval_s: f64,
    record_words: usize,
    record_count: usize,
}

/// Position and velocity of a target relative to its segment center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpkEvaluation {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
}

/// In-memory SPK kernel.
pub struct SpkKernel {
    data: Vec<u8>,
    endian: Endian,
    internal_name: String,
    segments: Vec<SpkSegment>,
}

impl std::fmt::Debug for SpkKernel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpkKernel")
            .field("internal_name", &self.internal_name)
            .field("bytes", &self.data.len())
            .field("segments", &self.segments.len())
            .finish()
    }
}

impl SpkKernel {
    /// Read and index an SPK file.
    pub fn load(path: &Path) -> Result<Self, KernelError> {
        let data = std::fs::read(path)
            .map_err(|e| KernelError::Io(format!("{}: {e}", path.display())))?;
        Self::from_bytes(data)
    }

    /// Index an SPK image already held in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, KernelError> {
        let file = daf::parse_file_record(&data)?;
        if file.nd != 2 || file.ni != 6 {
            return Err(KernelError::InvalidFormat(format!(
                "SPK summaries need ND=2, NI=6, found ND={} NI={}",
                file.nd, file.ni
            )));
        }

        let summaries = daf::read_summaries(&data, &file)?;
        let mut segments = Vec::with_capacity(summaries.len());
        for summary in summaries {
            let [start_epoch, end_epoch] = summary.doubles[..] else {
                return Err(KernelError::InvalidFormat("short segment summary".into()));
            };
            let [target, center, frame, data_type, start, end] = summary.ints[..] else {
                return Err(KernelError::InvalidFormat("short segment summary".into()));
            };
            if start < 1 || end < start {
                return Err(KernelError::InvalidFormat(format!(
                    "segment for body {target} has bad address range {start}..{end}"
                )));
            }
            let (start_address, end_address) = (start as usize, end as usize);
            let layout = if data_type == 2 {
                Some(read_type2_layout(&data, file.endian, start_address, end_address)?)
            } else {
                None
            };
            segments.push(SpkSegment {
                target,
                center,
                frame,
                data_type,
                start_epoch,
                end_epoch,
                start_address,
                end_address,
                layout,
            });
        }

        Ok(Self {
            data,
            endian: file.endian,
            internal_name: file.internal_name,
            segments,
        })
    }

    pub fn internal_name(&self) -> &str {
        &self.internal_name
    }

    pub fn segments(&self) -> &[SpkSegment] {
        &self.segments
    }

    /// Center of the first segment whose target is `target`.
    pub fn center_for(&self, target: i32) -> Option<i32> {
        self.segments
            .iter()
            .find(|s| s.target == target)
            .map(|s| s.center)
    }

    /// Evaluate `target` relative to `center` at a TDB epoch (seconds past J2000).
    ///
    /// When several segments cover the epoch, the last one in the file wins,
    /// as NAIF toolkits do.
    pub fn evaluate(
        &self,
        target: i32,
        center: i32,
        epoch_tdb_s: f64,
    ) -> Result<SpkEvaluation, KernelError> {
        let mut pair_seen = false;
        let segment = self
            .segments
            .iter()
            .rev()
            .filter(|s| s.target == target && s.center == center)
            .inspect(|_| pair_seen = true)
            .find(|s| s.covers(epoch_tdb_s));

        let Some(segment) = segment else {
            return Err(if pair_seen {
                KernelError::EpochOutOfRange {
                    target,
                    center,
                    epoch_tdb_s,
                }
            } else {
                KernelError::SegmentNotFound { target, center }
            });
        };

        match segment.layout {
            Some(layout) => self.evaluate_type2(segment, layout, epoch_tdb_s),
            None => Err(KernelError::UnsupportedType {
                target,
                data_type: segment.data_type,
            }),
        }
    }

    fn evaluate_type2(
        &self,
        segment: &SpkSegment,
        layout: Type2Layout,
        epoch_tdb_s: f64,
    ) -> Result<SpkEvaluation, KernelError> {
        let raw_index = ((epoch_tdb_s - layout.init) / layout.interval_s).floor();
        // The coverage end falls exactly on the last record boundary.
        let index = (raw_index.max(0.0) as usize).min(layout.record_count - 1);

        let first_word = segment.start_address + index * layout.record_words;
        if first_word + layout.record_words - 1 > segment.end_address {
            return Err(KernelError::InvalidFormat(format!(
                "record {index} of body {} runs past its segment",
                segment.target
            )));
        }
        let record = (0..layout.record_words)
            .map(|i| self.endian.read_f64(&self.data, word_offset(first_word + i)))
            .collect::<Result<Vec<_>, _>>()?;

        let (mid, radius) = (record[0], record[1]);
        let n = (layout.record_words - 2) / 3;
        let s = (epoch_tdb_s - mid) / radius;

        let mut eval = SpkEvaluation {
            position_km: [0.0; 3],
            velocity_km_s: [0.0; 3],
        };
        for axis in 0..3 {
            let coeffs = &record[2 + axis * n..2 + (axis + 1) * n];
            let (value, slope) = chebyshev::series_value_and_slope(coeffs, s);
            eval.position_km[axis] = value;
            eval.velocity_km_s[axis] = slope / radius;
        }
        Ok(eval)
    }

    /// Sum the segment chain from `body` down to the solar system barycenter.
    ///
    /// Returns `[x, y, z, vx, vy, vz]` in km and km/s.
    pub fn resolve_to_ssb(&self, body: i32, epoch_tdb_s: f64) -> Result<[f64; 6], KernelError> {
        let mut state = [0.0f64; 6];
        let mut code = body;
        let mut hops = 0;

        while code != 0 {
            hops += 1;
            if hops > 16 {
                return Err(KernelError::InvalidFormat(format!(
                    "segment chain for body {body} does not reach the barycenter"
                )));
            }
            let Some(center) = self.center_for(code) else {
                let bary = planet_body_to_barycenter(code);
                if bary != code {
                    code = bary;
                    continue;
                }
                return Err(KernelError::SegmentNotFound {
                    target: code,
                    center: 0,
                });
            };
            let eval = self.evaluate(code, center, epoch_tdb_s)?;
            for i in 0..3 {
                state[i] += eval.position_km[i];
                state[i + 3] += eval.velocity_km_s[i];
            }
            code = center;
        }

        Ok(state)
    }
}

fn read_type2_layout(
    data: &[u8],
    endian: Endian,
    start_address: usize,
    end_address: usize,
) -> Result<Type2Layout, KernelError> {
    if end_address < start_address + 3 {
        return Err(KernelError::InvalidFormat(
            "Type 2 segment too short for its directory".into(),
        ));
    }
    let word = |addr: usize| endian.read_f64(data, word_offset(addr));
    let init = word(end_address - 3)?;
    let interval_s = word(end_address - 2)?;
    let record_words = word(end_address - 1)?;
    let record_count = word(end_address)?;

    if interval_s <= 0.0 || record_words < 5.0 || record_count < 1.0 {
        return Err(KernelError::InvalidFormat(format!(
            "bad Type 2 directory: INTLEN={interval_s} RSIZE={record_words} N={record_count}"
        )));
    }
    let record_words = record_words as usize;
    if (record_words - 2) % 3 != 0 {
        return Err(KernelError::InvalidFormat(format!(
            "Type 2 RSIZE={record_words} is not 2 + 3n"
        )));
    }

    Ok(Type2Layout {
        init,
        interval_s,
        record_words,
        record_count: record_count as usize,
    })
}

/// Map a planet body code (x99) to its system barycenter (x).
///
/// Other codes are returned unchanged.
pub fn planet_body_to_barycenter(code: i32) -> i32 {
    if (199..=999).contains(&code) && code % 100 == 99 {
        code / 100
    } else {
        code
    }
}
