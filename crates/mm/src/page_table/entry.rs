//! Sv39 页表项

use crate::address::{Paddr, Ppn};
use crate::config::PTE_PPN_SHIFT;
use bitflags::bitflags;
use core::fmt;

bitflags! {
    /// 页表项标志位
    ///
    /// V/R/W/X 位于 bit 0..3，其余为 Sv39 标准位置。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PteFlags: u64 {
        /// 有效位
        const V = 1 << 0;
        /// 可读
        const R = 1 << 1;
        /// 可写
        const W = 1 << 2;
        /// 可执行
        const X = 1 << 3;
        /// 用户态可访问
        const U = 1 << 4;
        /// 全局映射
        const G = 1 << 5;
        /// 已访问
        const A = 1 << 6;
        /// 已写入
        const D = 1 << 7;
    }
}

/// 物理页号字段宽度（Sv39 为 44 位）
const PPN_WIDTH: u64 = 44;
const PPN_FIELD_MASK: u64 = (1 << PPN_WIDTH) - 1;
const FLAGS_MASK: u64 = 0xff;

/// Sv39 页表项
///
/// 编码：`((paddr >> 12) << 10) | flags`。[`new`](Self::new) 与
/// [`frame`](Self::frame) 互为逆运算，写入与下降遍历必须使用同一对编解码。
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTableEntry(u64);

impl PageTableEntry {
    /// 无效表项
    pub const fn empty() -> Self {
        Self(0)
    }

    /// 由目标帧与标志位构造表项（不会自动加上 V）
    pub fn new(frame: Paddr, flags: PteFlags) -> Self {
        let ppn = Ppn::from_addr_floor(frame).0 as u64 & PPN_FIELD_MASK;
        Self((ppn << PTE_PPN_SHIFT) | flags.bits())
    }

    /// 由原始数值构造
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// 原始数值
    pub const fn bits(&self) -> u64 {
        self.0
    }

    /// 物理页号字段
    pub fn ppn(&self) -> Ppn {
        Ppn(((self.0 >> PTE_PPN_SHIFT) & PPN_FIELD_MASK) as usize)
    }

    /// 表项指向的帧的起始物理地址
    pub fn frame(&self) -> Paddr {
        self.ppn().start_addr()
    }

    /// 标志位
    pub fn flags(&self) -> PteFlags {
        PteFlags::from_bits_truncate(self.0 & FLAGS_MASK)
    }

    /// 是否有效
    pub fn is_valid(&self) -> bool {
        self.flags().contains(PteFlags::V)
    }

    /// 是否为叶子表项（R/W/X 任一置位）
    pub fn is_leaf(&self) -> bool {
        self.is_valid() && self.flags().intersects(PteFlags::R | PteFlags::W | PteFlags::X)
    }
}

impl fmt::Debug for PageTableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageTableEntry")
            .field("frame", &format_args!("{:#x}", self.frame()))
            .field("flags", &self.flags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_reference_layout() {
        let pte = PageTableEntry::new(Paddr(0x8020_3000), PteFlags::V | PteFlags::R);
        assert_eq!(pte.bits(), ((0x8020_3000u64 >> 12) << 10) | 0b11);
    }

    #[test]
    fn test_encode_decode_symmetric() {
        for frame in [0x1000usize, 0x8000_0000, 0x1000_0000, 0x3f_ffff_f000] {
            let pte = PageTableEntry::new(Paddr(frame), PteFlags::V);
            assert_eq!(pte.frame(), Paddr(frame));
            assert!(pte.is_valid());
            assert!(!pte.is_leaf());
        }
    }

    #[test]
    fn test_flags_positions() {
        assert_eq!(PteFlags::V.bits(), 1);
        assert_eq!(PteFlags::R.bits(), 2);
        assert_eq!(PteFlags::W.bits(), 4);
        assert_eq!(PteFlags::X.bits(), 8);
    }

    #[test]
    fn test_empty_is_invalid() {
        assert!(!PageTableEntry::empty().is_valid());
        assert!(!PageTableEntry::default().is_leaf());
    }
}
