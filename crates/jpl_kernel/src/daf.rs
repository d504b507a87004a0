//! DAF (Double precision Array File) container layout.
//!
//! A DAF is a sequence of 1024-byte records. Record 1 is the file record;
//! summary records form a doubly linked list starting at `FWARD`, each one
//! followed by a name record. Addresses inside the file are 1-based
//! double-precision word indices.
//!
//! Reference: NAIF DAF Required Reading.

use crate::KernelError;

/// Size of one DAF record in bytes.
pub const RECORD_BYTES: usize = 1024;

/// Size of one double-precision word in bytes.
pub const WORD_BYTES: usize = 8;

/// Binary layout of the numeric data in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn read_f64(self, bytes: &[u8], offset: usize) -> Result<f64, KernelError> {
        let raw = take::<8>(bytes, offset)?;
        Ok(match self {
            Self::Little => f64::from_le_bytes(raw),
            Self::Big => f64::from_be_bytes(raw),
        })
    }

    pub fn read_i32(self, bytes: &[u8], offset: usize) -> Result<i32, KernelError> {
        let raw = take::<4>(bytes, offset)?;
        Ok(match self {
            Self::Little => i32::from_le_bytes(raw),
            Self::Big => i32::from_be_bytes(raw),
        })
    }
}

fn take<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], KernelError> {
    bytes
        .get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            KernelError::InvalidFormat(format!("read past end of file at byte {offset}"))
        })
}

/// Parsed DAF file record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Identification word, e.g. `DAF/SPK`.
    pub id_word: String,
    /// Number of double components per summary.
    pub nd: usize,
    /// Number of integer components per summary.
    pub ni: usize,
    /// Internal file name.
    pub internal_name: String,
    /// Record number of the first summary record.
    pub fward: usize,
    pub endian: Endian,
}

impl FileRecord {
    /// Summary size in double-precision words.
    pub fn summary_words(&self) -> usize {
        self.nd + self.ni.div_ceil(2)
    }
}

/// One array summary: `nd` doubles followed by `ni` integers.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub doubles: Vec<f64>,
    pub ints: Vec<i32>,
}

/// Parse the file record (first 1024 bytes).
///
/// The `LOCFMT` field names the binary format. Kernels written before it
/// existed leave it blank; those are detected by checking which byte order
/// yields a plausible `ND`.
pub fn parse_file_record(bytes: &[u8]) -> Result<FileRecord, KernelError> {
    if bytes.len() < RECORD_BYTES {
        return Err(KernelError::InvalidFormat(format!(
            "file is {} bytes, shorter than one DAF record",
            bytes.len()
        )));
    }

    let id_word = ascii(&bytes[0..8]);
    if !id_word.starts_with("DAF/") && !id_word.starts_with("NAIF/DAF") {
        return Err(KernelError::InvalidFormat(format!(
            "not a DAF file (id word {id_word:?})"
        )));
    }

    let endian = match ascii(&bytes[88..96]).as_str() {
        "LTL-IEEE" => Endian::Little,
        "BIG-IEEE" => Endian::Big,
        _ => detect_endian(bytes)?,
    };

    let nd = endian.read_i32(bytes, 8)?;
    let ni = endian.read_i32(bytes, 12)?;
    let fward = endian.read_i32(bytes, 76)?;
    if !(1..=124).contains(&nd) || !(2..=250).contains(&ni) || fward < 2 {
        return Err(KernelError::InvalidFormat(format!(
            "implausible DAF header: ND={nd} NI={ni} FWARD={fward}"
        )));
    }

    Ok(FileRecord {
        id_word,
        nd: nd as usize,
        ni: ni as usize,
        internal_name: ascii(&bytes[16..76]),
        fward: fward as usize,
        endian,
    })
}

fn detect_endian(bytes: &[u8]) -> Result<Endian, KernelError> {
    for endian in [Endian::Little, Endian::Big] {
        let nd = endian.read_i32(bytes, 8)?;
        if (1..=124).contains(&nd) {
            return Ok(endian);
        }
    }
    Err(KernelError::InvalidFormat(
        "cannot determine DAF byte order".into(),
    ))
}

fn ascii(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Walk the summary record chain and collect every array summary.
pub fn read_summaries(bytes: &[u8], file: &FileRecord) -> Result<Vec<Summary>, KernelError> {
    let endian = file.endian;
    let ss = file.summary_words();
    let max_records = bytes.len() / RECORD_BYTES;

    let mut summaries = Vec::new();
    let mut record = file.fward;
    let mut visited = 0usize;

    while record != 0 {
        visited += 1;
        if record > max_records || visited > max_records {
            return Err(KernelError::InvalidFormat(format!(
                "summary record {record} outside file ({max_records} records)"
            )));
        }

        let base = (record - 1) * RECORD_BYTES;
        let next = endian.read_f64(bytes, base)?;
        let count = endian.read_f64(bytes, base + 2 * WORD_BYTES)?;
        if count < 0.0 || (3.0 + count * ss as f64) > (RECORD_BYTES / WORD_BYTES) as f64 {
            return Err(KernelError::InvalidFormat(format!(
                "summary record {record} claims {count} summaries"
            )));
        }

        for i in 0..count as usize {
            let start = base + (3 + i * ss) * WORD_BYTES;
            let doubles = (0..file.nd)
                .map(|j| endian.read_f64(bytes, start + j * WORD_BYTES))
                .collect::<Result<Vec<_>, _>>()?;
            let int_base = start + file.nd * WORD_BYTES;
            let ints = (0..file.ni)
                .map(|j| endian.read_i32(bytes, int_base + j * 4))
                .collect::<Result<Vec<_>, _>>()?;
            summaries.push(Summary { doubles, ints });
        }

        record = next as usize;
    }

    Ok(summaries)
}

/// Byte offset of a 1-based DAF word address.
pub fn word_offset(address: usize) -> usize {
    (address - 1) * WORD_BYTES
}
