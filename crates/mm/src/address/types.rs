//! 物理地址与虚拟地址类型

use crate::config::{VPN_MASK, VPN_SHIFTS};
use crate::impl_address;

/// 物理地址
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Paddr(pub usize);
impl_address!(Paddr);

/// 虚拟地址
#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct Vaddr(pub usize);
impl_address!(Vaddr);

impl Vaddr {
    /// 第 `level` 级页表索引（0 = 根级，bit 38..30；2 = 叶子级，bit 20..12）
    #[inline]
    pub fn vpn_index(&self, level: usize) -> usize {
        (self.0 >> VPN_SHIFTS[level]) & VPN_MASK
    }

    /// 依次为根、中间、叶子级的三个 9 位索引
    pub fn indices(&self) -> [usize; 3] {
        [self.vpn_index(0), self.vpn_index(1), self.vpn_index(2)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AlignOps;

    #[test]
    fn test_vaddr_indices() {
        // vpn2 = 1, vpn1 = 2, vpn0 = 3, offset = 0x45
        let va = Vaddr((1 << 30) | (2 << 21) | (3 << 12) | 0x45);
        assert_eq!(va.indices(), [1, 2, 3]);
        assert_eq!(va.page_offset(), 0x45);
    }

    #[test]
    fn test_vaddr_indices_mask_high_bits() {
        // 第 39 位以上不参与索引
        let va = Vaddr((1 << 39) | (0x1ff << 30));
        assert_eq!(va.indices(), [0x1ff, 0, 0]);
    }

    #[test]
    fn test_align() {
        let pa = Paddr(0x8000_1234);
        assert!(!pa.is_page_aligned());
        assert_eq!(pa.align_down_to_page(), Paddr(0x8000_1000));
        assert_eq!(pa.align_up_to_page(), Paddr(0x8000_2000));
        assert_eq!(Paddr(0x8000_2000).align_up_to_page(), Paddr(0x8000_2000));
    }
}
