use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use thiserror::Error;
use zip::write::FileOptions;
use zip::CompressionMethod;

/// Largest single part loaded into memory.
pub const MAX_PART_BYTES: u64 = 256 * 1024 * 1024;

/// Largest total uncompressed payload loaded per package.
pub const MAX_TOTAL_BYTES: u64 = 512 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml error: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("missing package part: {0}")]
    MissingPart(String),
    #[error("package part too large: {part} is {size} bytes (max {max})")]
    PartTooLarge { part: String, size: u64, max: u64 },
    #[error("package too large: {total} bytes uncompressed (max {max})")]
    PackageTooLarge { total: u64, max: u64 },
}

/// Inflation limits applied while loading a package.
#[derive(Debug, Clone, Copy)]
pub struct PackageLimits {
    pub max_part_bytes: u64,
    pub max_total_bytes: u64,
}

impl Default for PackageLimits {
    fn default() -> Self {
        Self {
            max_part_bytes: MAX_PART_BYTES,
            max_total_bytes: MAX_TOTAL_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    bytes: Vec<u8>,
    compression: CompressionMethod,
}

/// An OPC package held fully in memory.
///
/// Entries keep their archive order and per-entry compression method so a
/// filtered copy reproduces the source archive byte layout apart from the
/// parts deliberately replaced. Name lookups resolve to the last entry when
/// an archive carries duplicates.
#[derive(Debug, Clone)]
pub struct Package {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl Package {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PackageError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PackageError> {
        Self::from_bytes_limited(bytes, PackageLimits::default())
    }

    pub fn from_bytes_limited(bytes: &[u8], limits: PackageLimits) -> Result<Self, PackageError> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(zip.len());
        let mut index = HashMap::with_capacity(zip.len());
        let mut total: u64 = 0;
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if !file.is_file() {
                continue;
            }
            let name = file.name().to_string();
            let compression = file.compression();
            let bytes = read_entry_bytes(&mut file, &name, limits, &mut total)?;
            index.insert(name.clone(), entries.len());
            entries.push(Entry {
                name,
                bytes,
                compression,
            });
        }
        Ok(Self { entries, index })
    }

    /// Look up a part by name, tolerating a leading slash on either side.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        if let Some(&i) = self.index.get(name) {
            return Some(&self.entries[i].bytes);
        }
        if let Some(stripped) = name.strip_prefix('/') {
            if let Some(&i) = self.index.get(stripped) {
                return Some(&self.entries[i].bytes);
            }
        } else {
            let prefixed = format!("/{name}");
            if let Some(&i) = self.index.get(prefixed.as_str()) {
                return Some(&self.entries[i].bytes);
            }
        }
        None
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Like [`Package::part`] but a missing part is an error.
    pub fn read_part(&self, name: &str) -> Result<&[u8], PackageError> {
        self.part(name)
            .ok_or_else(|| PackageError::MissingPart(name.to_string()))
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// `(name, bytes)` pairs in archive order.
    pub fn parts(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.bytes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write a copy of the package to `output`, substituting the bytes of any
    /// entry named in `overrides`. Entry order and compression methods follow
    /// the source archive; entries absent from `overrides` are carried over
    /// unchanged. Parent directories of `output` are created as needed.
    pub fn write_filtered(
        &self,
        output: impl AsRef<Path>,
        overrides: &BTreeMap<String, Vec<u8>>,
    ) -> Result<(), PackageError> {
        let output = output.as_ref();
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(output)?;
        self.write_filtered_to(BufWriter::new(file), overrides)
    }

    pub fn write_filtered_to<W: Write + Seek>(
        &self,
        writer: W,
        overrides: &BTreeMap<String, Vec<u8>>,
    ) -> Result<(), PackageError> {
        let mut zip = zip::ZipWriter::new(writer);
        for entry in &self.entries {
            let options = FileOptions::<()>::default()
                .compression_method(entry.compression)
                .last_modified_time(zip::DateTime::default());
            zip.start_file(entry.name.as_str(), options)?;
            match overrides.get(&entry.name) {
                Some(bytes) => zip.write_all(bytes)?,
                None => zip.write_all(&entry.bytes)?,
            }
        }
        zip.finish()?;
        Ok(())
    }

    pub fn write_filtered_to_bytes(
        &self,
        overrides: &BTreeMap<String, Vec<u8>>,
    ) -> Result<Vec<u8>, PackageError> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_filtered_to(&mut cursor, overrides)?;
        Ok(cursor.into_inner())
    }
}

fn read_entry_bytes(
    file: &mut zip::read::ZipFile<'_>,
    name: &str,
    limits: PackageLimits,
    total: &mut u64,
) -> Result<Vec<u8>, PackageError> {
    let declared = file.size();
    if declared > limits.max_part_bytes {
        return Err(PackageError::PartTooLarge {
            part: name.to_string(),
            size: declared,
            max: limits.max_part_bytes,
        });
    }
    // The declared size is untrusted metadata; cap the read one byte past the
    // limit so an understated header still trips the check.
    let mut buf = Vec::new();
    file.take(limits.max_part_bytes.saturating_add(1))
        .read_to_end(&mut buf)?;
    let observed = buf.len() as u64;
    if observed > limits.max_part_bytes {
        return Err(PackageError::PartTooLarge {
            part: name.to_string(),
            size: observed,
            max: limits.max_part_bytes,
        });
    }
    *total = total.saturating_add(observed);
    if *total > limits.max_total_bytes {
        return Err(PackageError::PackageTooLarge {
            total: *total,
            max: limits.max_total_bytes,
        });
    }
    Ok(buf)
}
