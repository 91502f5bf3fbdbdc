//! The archive interface the packet consumes.
//!
//! QWK packets travel as compressed archives (historically ZIP, sometimes
//! ARJ or LZH). The container format is someone else's problem: the packet
//! only needs a name-addressed byte-stream producer. Entry names compare
//! case-insensitively, DOS style. Opened sources may return short reads;
//! the record reader copes.

use std::io::Read;

use crate::error::QwkError;

/// A provider of named byte streams.
pub trait Archive {
    /// The entry names, in archive order.
    fn list_files(&self) -> Vec<String>;

    fn exists(&self, name: &str) -> bool {
        self.list_files()
            .iter()
            .any(|file| file.eq_ignore_ascii_case(name))
    }

    /// The uncompressed size of an entry, when the container knows it.
    ///
    /// Used to enforce the per-entry size limit before extraction.
    fn entry_size(&self, name: &str) -> Option<u64>;

    /// Opens an entry for reading.
    fn open(&mut self, name: &str) -> Result<Box<dyn Read + '_>, QwkError>;
}

/// An archive over bytes already in memory.
///
/// The in-tree implementation: tests build packets with it, and callers
/// that extract entries themselves can feed them in directly.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, replacing any existing entry of the same name.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let name = name.into();

        match self.find(&name) {
            Some(index) => self.entries[index].1 = bytes.into(),
            None => self.entries.push((name, bytes.into())),
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(entry, _)| entry.eq_ignore_ascii_case(name))
    }
}

impl Archive for MemoryArchive {
    fn list_files(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    fn exists(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    fn entry_size(&self, name: &str) -> Option<u64> {
        self.find(name).map(|index| self.entries[index].1.len() as u64)
    }

    fn open(&mut self, name: &str) -> Result<Box<dyn Read + '_>, QwkError> {
        match self.find(name) {
            Some(index) => Ok(Box::new(self.entries[index].1.as_slice())),
            None => Err(QwkError::EntryNotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut archive = MemoryArchive::new();
        archive.insert("CONTROL.DAT", b"x".to_vec());

        assert!(archive.exists("control.dat"));
        assert_eq!(archive.entry_size("Control.Dat"), Some(1));

        let mut bytes = Vec::new();
        archive.open("control.DAT").unwrap().read_to_end(&mut bytes).unwrap();
        assert_eq!(bytes, b"x");
    }

    #[test]
    fn test_insert_replaces() {
        let mut archive = MemoryArchive::new();
        archive.insert("A.NDX", b"old".to_vec());
        archive.insert("a.ndx", b"new".to_vec());

        assert_eq!(archive.list_files(), ["A.NDX"]);
        assert_eq!(archive.entry_size("A.NDX"), Some(3));
    }

    #[test]
    fn test_missing_entry() {
        let mut archive = MemoryArchive::new();

        assert!(!archive.exists("MESSAGES.DAT"));
        assert!(matches!(
            archive.open("MESSAGES.DAT"),
            Err(QwkError::EntryNotFound(_)),
        ));
    }
}
