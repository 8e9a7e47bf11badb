//! 页表页

use super::PageTableEntry;
use crate::config::PT_ENTRIES;
use core::ops::{Index, IndexMut};

/// 一个页表页：恰好占满一帧的 512 个表项
#[repr(C, align(4096))]
#[derive(Clone)]
pub struct PageTable {
    entries: [PageTableEntry; PT_ENTRIES],
}

impl PageTable {
    /// 全部表项无效的页表
    pub const fn empty() -> Self {
        Self {
            entries: [PageTableEntry::empty(); PT_ENTRIES],
        }
    }

    /// 全部表项
    pub fn entries(&self) -> &[PageTableEntry; PT_ENTRIES] {
        &self.entries
    }

    /// 有效表项的数量
    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_valid()).count()
    }
}

impl Index<usize> for PageTable {
    type Output = PageTableEntry;

    fn index(&self, index: usize) -> &PageTableEntry {
        &self.entries[index]
    }
}

impl IndexMut<usize> for PageTable {
    fn index_mut(&mut self, index: usize) -> &mut PageTableEntry {
        &mut self.entries[index]
    }
}

const _: () = assert!(core::mem::size_of::<PageTable>() == crate::config::PAGE_SIZE);
