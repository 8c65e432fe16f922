use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::{CELLS, DEFAULT_GOAL};

const MAGIC: &[u8; 4] = b"G2S1";
const VERSION: u8 = 1;
const HEADER_LEN: usize = 4 + 1;
const CHECKSUM_LEN: usize = 4;

/// Flat form of a grid: cell values row-major plus the scalar game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub values: [u32; CELLS],
    pub goal: u32,
    pub moves: u64,
    pub score: u64,
    pub is_won: bool,
    pub game_time: Duration,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            values: [0; CELLS],
            goal: DEFAULT_GOAL,
            moves: 0,
            score: 0,
            is_won: false,
            game_time: Duration::ZERO,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SerializationError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),
    #[error("invalid magic or version")]
    MagicOrVersion,
    #[error("checksum mismatch")]
    Checksum,
    #[error("file too short or malformed")]
    Malformed,
    #[error("unrecognized save file extension: {0}")]
    UnknownFormat(String),
}

/// On-disk encoding of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveFormat {
    /// serde_json text, `*.json`.
    Json,
    /// Magic + version + postcard payload + CRC32C trailer, `*.g2s`.
    Binary,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Json => "json",
            SaveFormat::Binary => "g2s",
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SaveFormat, SerializationError> {
        let ext = path.as_ref().extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext {
            "json" => Ok(SaveFormat::Json),
            "g2s" => Ok(SaveFormat::Binary),
            other => Err(SerializationError::UnknownFormat(other.to_string())),
        }
    }

    pub fn encode(self, snapshot: &Snapshot) -> Result<Vec<u8>, SerializationError> {
        match self {
            SaveFormat::Json => Ok(serde_json::to_vec_pretty(snapshot)?),
            SaveFormat::Binary => encode_binary(snapshot),
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Result<Snapshot, SerializationError> {
        match self {
            SaveFormat::Json => Ok(serde_json::from_slice(bytes)?),
            SaveFormat::Binary => decode_binary(bytes),
        }
    }
}

/// Encode a snapshot as `G2S1 | version | postcard | crc32c`.
pub fn encode_binary(snapshot: &Snapshot) -> Result<Vec<u8>, SerializationError> {
    let payload = postcard::to_allocvec(snapshot)?;
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len() + CHECKSUM_LEN);
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);
    buf.extend_from_slice(&payload);
    // Trailer: CRC32C of all preceding bytes
    let checksum = crc32c::crc32c(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

pub fn decode_binary(bytes: &[u8]) -> Result<Snapshot, SerializationError> {
    if bytes.len() < HEADER_LEN + CHECKSUM_LEN {
        return Err(SerializationError::Malformed);
    }
    // Validate checksum before looking at any field
    let (content, trailer) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
    let file_crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
    if file_crc != crc32c::crc32c(content) {
        return Err(SerializationError::Checksum);
    }
    if &content[..4] != MAGIC || content[4] != VERSION {
        return Err(SerializationError::MagicOrVersion);
    }
    Ok(postcard::from_bytes(&content[HEADER_LEN..])?)
}

/// Write a snapshot, picking the encoding from the file extension.
pub fn write_snapshot<P: AsRef<Path>>(path: P, snapshot: &Snapshot) -> Result<(), SerializationError> {
    let path = path.as_ref();
    let bytes = SaveFormat::from_path(path)?.encode(snapshot)?;
    fs::write(path, bytes)?;
    debug!("saved game to {}", path.display());
    Ok(())
}

/// Read a snapshot; `Ok(None)` when there is no such file.
pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Option<Snapshot>, SerializationError> {
    let path = path.as_ref();
    let format = SaveFormat::from_path(path)?;
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let snapshot = format.decode(&bytes)?;
    debug!("read saved game from {}", path.display());
    Ok(Some(snapshot))
}
