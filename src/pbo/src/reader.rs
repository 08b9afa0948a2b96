//! PBO files on disk

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::header::{self, Entry, Packing};
use crate::{lzss, Error, Result, PREFIX_PROPERTY};

/// An opened PBO.
///
/// Holds the parsed header only; the file is reopened whenever entry data
/// is read, so many `Pbo`s can be alive at once without pinning descriptors.
#[derive(Debug)]
pub struct Pbo {
    path: PathBuf,
    properties: Vec<(String, String)>,
    entries: Vec<Entry>,
}

impl Pbo {
    /// Open a PBO and parse its header table
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let header = header::parse(&mut reader)?;

        if let Some(last) = header.entries.last() {
            let end = last.offset + u64::from(last.data_size);
            if end > file_len {
                return Err(Error::Truncated(format!(
                    "entry '{}' ends at {} but file is {} bytes",
                    last.name, end, file_len
                )));
            }
        }

        Ok(Self {
            path,
            properties: header.properties,
            entries: header.entries,
        })
    }

    /// Path this PBO was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component of the path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Header properties in file order
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Look up a header property, ignoring ASCII case of the key
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Declared internal path prefix, if the header has one
    pub fn prefix(&self) -> Option<&str> {
        self.property(PREFIX_PROPERTY)
    }

    /// Entries in header order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Reopen the file for reading entry data
    pub fn data(&self) -> Result<DataReader> {
        let file = File::open(&self.path)?;
        Ok(DataReader {
            file: BufReader::new(file),
        })
    }

    /// Read one entry's content
    pub fn read(&self, entry: &Entry) -> Result<Vec<u8>> {
        self.data()?.read(entry)
    }
}

/// Open handle for reading entry data from one PBO
pub struct DataReader {
    file: BufReader<File>,
}

impl DataReader {
    /// Read one entry's content, unpacking it when needed
    pub fn read(&mut self, entry: &Entry) -> Result<Vec<u8>> {
        read_entry(&mut self.file, entry)
    }
}

fn read_entry<R: Read + Seek>(source: &mut R, entry: &Entry) -> Result<Vec<u8>> {
    if entry.packing == Packing::Encrypted {
        return Err(Error::Encrypted(entry.name.clone()));
    }

    source.seek(SeekFrom::Start(entry.offset))?;
    let mut stored = vec![0u8; entry.data_size as usize];
    source.read_exact(&mut stored)?;

    if entry.is_packed() {
        return lzss::decompress(&stored, entry.original_size as usize);
    }

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::tests::{properties, record};
    use crate::PACKING_COMPRESSED;
    use std::io::Write;

    fn write_pbo(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(data).unwrap();
        path
    }

    #[test]
    fn test_open_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = properties(&[("Prefix", "myMod\\data")]);
        data.extend_from_slice(&record("script.sqf", 0, 0, 5));
        data.extend_from_slice(&record("tex.jpg", 0, 0, 3));
        data.extend_from_slice(&record("", 0, 0, 0));
        data.extend_from_slice(b"hello");
        data.extend_from_slice(b"jpg");
        let path = write_pbo(dir.path(), "mod.pbo", &data);

        let pbo = Pbo::open(&path).unwrap();
        assert_eq!(pbo.file_name(), "mod.pbo");
        assert_eq!(pbo.prefix(), Some("myMod\\data"));
        assert_eq!(pbo.entries().len(), 2);

        let mut reader = pbo.data().unwrap();
        assert_eq!(reader.read(&pbo.entries()[1]).unwrap(), b"jpg");
        assert_eq!(reader.read(&pbo.entries()[0]).unwrap(), b"hello");
    }

    #[test]
    fn test_missing_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = record("a.txt", 0, 0, 1);
        data.extend_from_slice(&record("", 0, 0, 0));
        data.push(b'a');
        let path = write_pbo(dir.path(), "bare.pbo", &data);

        let pbo = Pbo::open(&path).unwrap();
        assert_eq!(pbo.prefix(), None);
    }

    #[test]
    fn test_read_packed_entry() {
        let dir = tempfile::tempdir().unwrap();
        let stream = [0b0000_0111, b'a', b'b', b'c', 0x03, 0x03];
        let mut data = record("packed.txt", PACKING_COMPRESSED, 9, stream.len() as u32);
        data.extend_from_slice(&record("", 0, 0, 0));
        data.extend_from_slice(&stream);
        let path = write_pbo(dir.path(), "packed.pbo", &data);

        let pbo = Pbo::open(&path).unwrap();
        assert_eq!(pbo.read(&pbo.entries()[0]).unwrap(), b"abcabcabc");
    }

    #[test]
    fn test_data_past_end_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = record("big.bin", 0, 0, 100);
        data.extend_from_slice(&record("", 0, 0, 0));
        data.extend_from_slice(&[0u8; 10]);
        let path = write_pbo(dir.path(), "short.pbo", &data);

        let err = Pbo::open(&path).unwrap_err();
        assert!(matches!(err, Error::Truncated(_)));
    }

    #[test]
    fn test_encrypted_entry_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = record("secret.bin", crate::PACKING_ENCRYPTED, 0, 2);
        data.extend_from_slice(&record("", 0, 0, 0));
        data.extend_from_slice(&[1, 2]);
        let path = write_pbo(dir.path(), "enc.pbo", &data);

        let pbo = Pbo::open(&path).unwrap();
        let err = pbo.read(&pbo.entries()[0]).unwrap_err();
        assert!(matches!(err, Error::Encrypted(_)));
    }
}
