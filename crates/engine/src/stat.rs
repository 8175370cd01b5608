//! Statistics records returned by `stat` and `info`

use lmdb_master_sys as ffi;
use serde::{Deserialize, Serialize};

/// B-tree statistics for an environment's main database or one database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stat {
    /// Size of a database page
    pub page_size: u32,
    /// Depth (height) of the B-tree
    pub depth: u32,
    /// Number of internal (non-leaf) pages
    pub branch_pages: u64,
    /// Number of leaf pages
    pub leaf_pages: u64,
    /// Number of overflow pages
    pub overflow_pages: u64,
    /// Number of data items
    pub entries: u64,
}

impl Stat {
    /// Host rendering order: `{psize depth branch leaf overflow entries}`.
    pub fn to_tuple(&self) -> [u64; 6] {
        [
            self.page_size as u64,
            self.depth as u64,
            self.branch_pages,
            self.leaf_pages,
            self.overflow_pages,
            self.entries,
        ]
    }
}

impl From<&ffi::MDB_stat> for Stat {
    fn from(raw: &ffi::MDB_stat) -> Self {
        Stat {
            page_size: raw.ms_psize as u32,
            depth: raw.ms_depth as u32,
            branch_pages: raw.ms_branch_pages as u64,
            leaf_pages: raw.ms_leaf_pages as u64,
            overflow_pages: raw.ms_overflow_pages as u64,
            entries: raw.ms_entries as u64,
        }
    }
}

/// Environment-wide information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnvInfo {
    /// Size of the data memory map
    pub map_size: u64,
    /// ID of the last used page
    pub last_pgno: u64,
    /// ID of the last committed transaction
    pub last_txnid: u64,
    /// Maximum number of reader slots
    pub max_readers: u32,
    /// Number of reader slots in use
    pub num_readers: u32,
}

impl EnvInfo {
    /// Host rendering order: `{mapsize last_pgno last_txnid maxreaders numreaders}`.
    pub fn to_tuple(&self) -> [u64; 5] {
        [
            self.map_size,
            self.last_pgno,
            self.last_txnid,
            self.max_readers as u64,
            self.num_readers as u64,
        ]
    }
}

impl From<&ffi::MDB_envinfo> for EnvInfo {
    fn from(raw: &ffi::MDB_envinfo) -> Self {
        EnvInfo {
            map_size: raw.me_mapsize as u64,
            last_pgno: raw.me_last_pgno as u64,
            last_txnid: raw.me_last_txnid as u64,
            max_readers: raw.me_maxreaders as u32,
            num_readers: raw.me_numreaders as u32,
        }
    }
}
