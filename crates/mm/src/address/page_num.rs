//! 物理页号

use crate::address::operations::UsizeConvert;
use crate::address::types::Paddr;
use crate::config::PAGE_SHIFT;

/// [Ppn] (Physical Page Number)
/// ---------------------
/// 物理页码，对应物理地址 (Paddr)。页表项中保存的就是它。
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Ppn(pub usize);

impl UsizeConvert for Ppn {
    fn as_usize(&self) -> usize {
        self.0
    }

    fn from_usize(value: usize) -> Self {
        Self(value)
    }
}

impl Ppn {
    /// 包含该地址的页的页号（向下取整）
    pub fn from_addr_floor(addr: Paddr) -> Self {
        Self(addr.0 >> PAGE_SHIFT)
    }

    /// 页的起始物理地址
    pub fn start_addr(self) -> Paddr {
        Paddr(self.0 << PAGE_SHIFT)
    }
}

impl From<Paddr> for Ppn {
    fn from(addr: Paddr) -> Self {
        Ppn::from_addr_floor(addr)
    }
}
