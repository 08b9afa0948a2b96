//! PBO fixtures for tests

use std::path::{Path, PathBuf};

/// Contents of a fixture PBO
#[derive(Debug, Default, Clone)]
pub struct PboSpec {
    prefix: Option<String>,
    files: Vec<FixtureFile>,
}

#[derive(Debug, Clone)]
struct FixtureFile {
    name: String,
    stored: Vec<u8>,
    packing: u32,
    original_size: u32,
}

impl PboSpec {
    pub fn new(prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(String::from),
            files: Vec::new(),
        }
    }

    pub fn file(mut self, name: &str, content: &[u8]) -> Self {
        self.files.push(FixtureFile {
            name: name.to_string(),
            stored: content.to_vec(),
            packing: 0,
            original_size: content.len() as u32,
        });
        self
    }

    /// An LZSS-packed entry whose stored bytes are `stream` verbatim
    pub fn packed(mut self, name: &str, stream: &[u8], original_size: u32) -> Self {
        self.files.push(FixtureFile {
            name: name.to_string(),
            stored: stream.to_vec(),
            packing: pbo::PACKING_COMPRESSED,
            original_size,
        });
        self
    }

    /// Serialize as a PBO with a zeroed checksum trailer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = Vec::new();

        if let Some(prefix) = &self.prefix {
            push_record(&mut data, "", pbo::PACKING_VERSION, 0, 0);
            push_cstring(&mut data, "prefix");
            push_cstring(&mut data, prefix);
            data.push(0);
        }

        for file in &self.files {
            push_record(
                &mut data,
                &file.name,
                file.packing,
                file.original_size,
                file.stored.len() as u32,
            );
        }
        push_record(&mut data, "", 0, 0, 0);

        for file in &self.files {
            data.extend_from_slice(&file.stored);
        }

        data.push(0);
        data.extend_from_slice(&[0u8; 20]);
        data
    }
}

fn push_cstring(data: &mut Vec<u8>, s: &str) {
    data.extend_from_slice(s.as_bytes());
    data.push(0);
}

fn push_record(data: &mut Vec<u8>, name: &str, packing: u32, original: u32, size: u32) {
    push_cstring(data, name);
    for field in [packing, original, 0, 0, size] {
        data.extend_from_slice(&field.to_le_bytes());
    }
}

/// Write `spec` to `dir/name`, creating `dir` if needed
pub fn write_pbo(dir: &Path, name: &str, spec: &PboSpec) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, spec.to_bytes()).unwrap();
    path
}
