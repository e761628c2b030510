//! Index data model.

use bytes::Bytes;
use std::fmt;

/// A contiguous range of row ids allocated for one table.
///
/// Ranges handed to concurrent callers never overlap. The allocator may
/// return fewer ids than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowIdBatch {
    /// First row id of the range.
    pub row_id_start: u64,
    /// Number of row ids in the range.
    pub length: u32,
}

impl RowIdBatch {
    /// Create a batch.
    pub fn new(row_id_start: u64, length: u32) -> Self {
        Self {
            row_id_start,
            length,
        }
    }

    /// Row id at `offset` within the batch.
    pub fn row_id(&self, offset: u32) -> u64 {
        self.row_id_start + u64::from(offset)
    }
}

/// Identity of one logical row in an index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    pub table_id: u64,
    pub index_id: u64,
    /// Transaction-visibility point the entry is written (or deleted) at.
    pub timestamp: u64,
    /// Key bytes, unique across the whole run.
    pub key: Bytes,
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}@{}",
            self.table_id,
            self.index_id,
            String::from_utf8_lossy(&self.key),
            self.timestamp
        )
    }
}

/// Physical placement of a row: file, row group, offset in the row group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowLocation {
    pub file_id: u64,
    pub rg_id: u32,
    pub rg_row_offset: u32,
}

/// Row id, index key and location of one row, as stored by the primary index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryIndexEntry {
    pub row_id: u64,
    pub index_key: IndexKey,
    pub row_location: RowLocation,
}
