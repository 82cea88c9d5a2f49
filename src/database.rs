use std::{fs, path::Path};

use ahash::AHashMap;
use log::info;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct SequenceRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

/// Named candidate sequences, kept in file order. Names are unique.
#[derive(Debug, Default)]
pub struct SequenceDatabase {
    records: Vec<SequenceRecord>,
    indices: AHashMap<String, usize>,
}

impl SequenceDatabase {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends a record, rejecting names that are already present.
    pub fn insert(&mut self, name: String, sequence: Vec<u8>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptySequenceName);
        }
        if self.indices.contains_key(&name) {
            return Err(Error::DuplicateSequenceName(name));
        }

        self.indices.insert(name.clone(), self.records.len());
        self.records.push(SequenceRecord { name, sequence });
        Ok(())
    }

    /// Parses records of the form `@name` followed by any number of sequence lines.
    ///
    /// Text before the first `@` is ignored, and whitespace inside sequences is removed.
    pub fn parse(text: &[u8]) -> Result<Self> {
        let mut result = Self::new();

        for record in text.split(|&byte| byte == b'@').skip(1) {
            let (name, sequence) = match record.iter().position(|&byte| byte == b'\n') {
                Some(line_end) => (&record[..line_end], &record[line_end + 1..]),
                None => (record, &[][..]),
            };
            let name = String::from_utf8_lossy(name).trim_end().to_string();
            let sequence = strip_whitespace(sequence);

            result.insert(name, sequence)?;
        }

        Ok(result)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let result = Self::parse(&fs::read(path)?)?;
        info!(
            "Loaded {} sequences from {}",
            result.len(),
            path.display()
        );
        Ok(result)
    }

    pub fn get(&self, name: &str) -> Option<&SequenceRecord> {
        self.indices.get(name).map(|&index| &self.records[index])
    }

    pub fn records(&self) -> &[SequenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads a reference text, dropping all ASCII whitespace.
pub fn read_reference(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let reference = strip_whitespace(&fs::read(path)?);
    info!(
        "Loaded reference of length {} from {}",
        reference.len(),
        path.display()
    );
    Ok(reference)
}

fn strip_whitespace(text: &[u8]) -> Vec<u8> {
    text.iter()
        .copied()
        .filter(|byte| !byte.is_ascii_whitespace())
        .collect()
}
