//! PBO header table parsing

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use crate::{Error, Result, PACKING_COMPRESSED, PACKING_ENCRYPTED, PACKING_VERSION};

/// How an entry's data block is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packing {
    Uncompressed,
    Compressed,
    Encrypted,
    Unknown(u32),
}

impl Packing {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Uncompressed,
            PACKING_COMPRESSED => Self::Compressed,
            PACKING_ENCRYPTED => Self::Encrypted,
            other => Self::Unknown(other),
        }
    }
}

/// One record of the header table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Internal path, `\`-separated (e.g. "data\\tex.paa")
    pub name: String,
    pub packing: Packing,
    /// Size after unpacking (0 means same as `data_size`)
    pub original_size: u32,
    pub timestamp: u32,
    /// Size of the stored block
    pub data_size: u32,
    /// Absolute offset of the stored block in the file
    pub offset: u64,
}

impl Entry {
    /// Size of the entry's content once read
    pub fn size(&self) -> u64 {
        if self.original_size != 0 {
            u64::from(self.original_size)
        } else {
            u64::from(self.data_size)
        }
    }

    /// Whether the stored block must go through LZSS
    pub fn is_packed(&self) -> bool {
        self.packing == Packing::Compressed
            && self.original_size != 0
            && self.original_size != self.data_size
    }
}

/// Parsed header table
#[derive(Debug, Default)]
pub(crate) struct Header {
    pub properties: Vec<(String, String)>,
    pub entries: Vec<Entry>,
}

/// Parse the header table, assigning data offsets relative to the end of
/// the table.
pub(crate) fn parse<R: Read>(reader: &mut R) -> Result<Header> {
    let mut header = Header::default();
    let mut consumed: u64 = 0;

    loop {
        let name = read_cstring(reader, &mut consumed)?;
        let packing = read_u32(reader, &mut consumed)?;
        let original_size = read_u32(reader, &mut consumed)?;
        let _reserved = read_u32(reader, &mut consumed)?;
        let timestamp = read_u32(reader, &mut consumed)?;
        let data_size = read_u32(reader, &mut consumed)?;

        if name.is_empty() {
            if packing == PACKING_VERSION {
                read_properties(reader, &mut consumed, &mut header.properties)?;
                continue;
            }
            break;
        }

        header.entries.push(Entry {
            name,
            packing: Packing::from_raw(packing),
            original_size,
            timestamp,
            data_size,
            offset: 0,
        });
    }

    let mut offset = consumed;
    for entry in &mut header.entries {
        entry.offset = offset;
        offset += u64::from(entry.data_size);
    }

    Ok(header)
}

fn read_properties<R: Read>(
    reader: &mut R,
    consumed: &mut u64,
    properties: &mut Vec<(String, String)>,
) -> Result<()> {
    loop {
        let key = read_cstring(reader, consumed)?;
        if key.is_empty() {
            return Ok(());
        }
        let value = read_cstring(reader, consumed)?;
        properties.push((key, value));
    }
}

fn read_cstring<R: Read>(reader: &mut R, consumed: &mut u64) -> Result<String> {
    let mut bytes = Vec::new();
    loop {
        let byte = reader.read_u8().map_err(truncated("string"))?;
        *consumed += 1;
        if byte == 0 {
            break;
        }
        bytes.push(byte);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_u32<R: Read>(reader: &mut R, consumed: &mut u64) -> Result<u32> {
    let value = reader
        .read_u32::<LittleEndian>()
        .map_err(truncated("header field"))?;
    *consumed += 4;
    Ok(value)
}

fn truncated(what: &'static str) -> impl Fn(io::Error) -> Error {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::Truncated(format!("unexpected end of header while reading {}", what))
        } else {
            Error::Io(e)
        }
    }
}
