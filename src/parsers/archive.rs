//! In-memory view of an export archive
//!
//! Exports arrive either as the ZIP the chat service hands out or as a directory the user
//! already extracted. Both are read once, up front: every member name is listed in archive
//! order and every `.json` member is loaded into memory. Parsers only ever see an
//! [`Archive`], never the underlying container.

use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use serde_json::Value;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::utils::normalize_member_name;

/// Largest JSON member we are willing to inflate: 512MB
const MAX_MEMBER_SIZE_BYTES: u64 = 512 * 1024 * 1024;

const JSON_EXTENSION: &str = ".json";

#[derive(Debug, Default, Clone)]
pub struct Archive {
    // Every member in archive order; only JSON members carry content
    members: IndexMap<String, Option<Vec<u8>>>,
}

impl Archive {
    /// Open a ZIP file or an extracted export directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or cannot be read
    /// - The file is not a valid ZIP archive
    /// - A JSON member exceeds the size limit (512MB)
    pub fn open(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("Failed to open archive: {}", path.display()))?;

        if metadata.is_dir() {
            Self::from_dir(path)
        } else {
            let file = File::open(path)
                .with_context(|| format!("Failed to open archive: {}", path.display()))?;
            Self::from_zip(file)
                .with_context(|| format!("Failed to read ZIP archive: {}", path.display()))
        }
    }

    /// Read every member of a ZIP archive
    pub fn from_zip<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader).context("Invalid ZIP archive")?;
        let mut archive = Self::default();

        for i in 0..zip.len() {
            let mut member = zip.by_index(i).context("Failed to read ZIP member")?;
            if member.is_dir() {
                continue;
            }

            let name = normalize_member_name(member.name());
            if name.ends_with(JSON_EXTENSION) {
                let declared = member.size();
                validate_member_size(&name, declared)?;
                let buf = read_bounded(&mut member, &name, declared, MAX_MEMBER_SIZE_BYTES)?;
                archive.insert(name, Some(buf));
            } else {
                archive.insert(name, None);
            }
        }

        Ok(archive)
    }

    /// Read an extracted export directory; symlinks are not followed
    pub fn from_dir(root: &Path) -> Result<Self> {
        let mut archive = Self::default();

        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Failed to walk export directory: {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root).with_context(|| {
                format!("Walked outside export directory: {}", entry.path().display())
            })?;
            let name = normalize_member_name(&relative.to_string_lossy());

            if name.ends_with(JSON_EXTENSION) {
                let size = entry
                    .metadata()
                    .with_context(|| format!("Failed to read metadata for {}", name))?
                    .len();
                validate_member_size(&name, size)?;
                let buf = fs::read(entry.path())
                    .with_context(|| format!("Failed to read {}", entry.path().display()))?;
                archive.insert(name, Some(buf));
            } else {
                archive.insert(name, None);
            }
        }

        Ok(archive)
    }

    /// Build an archive from in-memory members, in the given order
    pub fn from_members<I, N, C>(members: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: Into<Vec<u8>>,
    {
        let mut archive = Self::default();
        for (name, content) in members {
            archive.insert(normalize_member_name(name.as_ref()), Some(content.into()));
        }
        archive
    }

    fn insert(&mut self, name: String, content: Option<Vec<u8>>) {
        self.members.insert(name, content);
    }

    /// Member names in archive order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Raw bytes of a loaded (JSON) member
    pub fn read(&self, name: &str) -> Option<&[u8]> {
        self.members.get(name).and_then(|content| content.as_deref())
    }

    /// Decode a member as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the member is missing or is not valid JSON.
    pub fn read_json(&self, name: &str) -> Result<Value> {
        let Some(bytes) = self.read(name) else {
            bail!("{} not found in archive", name);
        };
        serde_json::from_slice(bytes).with_context(|| format!("Failed to parse JSON in {}", name))
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Read at most `limit` bytes, failing if the reader yields more
///
/// ZIP headers may understate the uncompressed size, so the declared size only
/// sizes the buffer and the limit is enforced on the bytes actually inflated.
fn read_bounded<R: Read>(reader: R, name: &str, declared: u64, limit: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(declared.min(limit) as usize);
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut buf)
        .with_context(|| format!("Failed to decompress {}", name))?;
    if buf.len() as u64 > limit {
        bail!("Archive member too large: {} (more than {} bytes)", name, limit);
    }
    Ok(buf)
}

fn validate_member_size(name: &str, size: u64) -> Result<()> {
    if size > MAX_MEMBER_SIZE_BYTES {
        bail!(
            "Archive member too large: {} ({} bytes, max {} bytes)",
            name,
            size,
            MAX_MEMBER_SIZE_BYTES
        );
    }
    Ok(())
}
