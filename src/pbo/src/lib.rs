//! Reader for Arma PBO archive containers
//!
//! # Format Overview
//!
//! A PBO is a header table followed by the entry data blocks:
//!
//! - Header records: NUL-terminated name, then five little-endian `u32`s
//!   (packing method, original size, reserved, timestamp, data size)
//! - A record with an empty name and packing `Vers` starts the property
//!   block: NUL-terminated key/value pairs ended by an empty key
//! - A record with an empty name and any other packing ends the table
//! - Data blocks follow in table order, each `data size` bytes long
//! - A trailing checksum (ignored here)
//!
//! Only the header is read by [`Pbo::open`]; entry bytes are read on demand.

mod header;
mod lzss;
mod reader;

pub use header::{Entry, Packing};
pub use reader::{DataReader, Pbo};

/// Packing method of the property block record: "Vers"
pub const PACKING_VERSION: u32 = 0x5665_7273;

/// Packing method of LZSS-compressed entries: "Cprs"
pub const PACKING_COMPRESSED: u32 = 0x4370_7273;

/// Packing method of encrypted entries: "Encr"
pub const PACKING_ENCRYPTED: u32 = 0x456e_6372;

/// Property key holding the archive's internal path prefix
pub const PREFIX_PROPERTY: &str = "prefix";

/// Errors from PBO reading
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Truncated PBO: {0}")]
    Truncated(String),

    #[error("Entry '{0}' is encrypted")]
    Encrypted(String),

    #[error("LZSS decompression error: {0}")]
    Decompression(String),
}

pub type Result<T> = std::result::Result<T, Error>;
