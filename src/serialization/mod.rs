//! Persistence surfaces for saved games and statistics.
//!
//! A [`Snapshot`] is the flat, row-major form of a grid. It can be written
//! as JSON or as a compact binary save (`G2S1` magic, postcard payload,
//! CRC32C trailer); the format is chosen from the file extension. Best-score
//! [`Stats`] are kept in a separate JSON file.

mod snapshot;
mod stats;

pub use snapshot::{
    Snapshot,
    SaveFormat,
    SerializationError,
    encode_binary,
    decode_binary,
    write_snapshot,
    read_snapshot,
};
pub use stats::{Stats, read_stats, write_stats};
