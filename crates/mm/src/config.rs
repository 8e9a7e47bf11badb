//! 内存布局常量与物理内存区域描述

use crate::error::{MmError, MmResult};

/// 页大小（字节）
pub const PAGE_SIZE: usize = 4096;
/// 页内偏移位数
pub const PAGE_SHIFT: usize = 12;
/// 页表项中物理页号字段的起始位
pub const PTE_PPN_SHIFT: usize = 10;
/// 每级虚拟页号索引的位数
pub const VPN_BITS: usize = 9;
/// 单级索引掩码
pub const VPN_MASK: usize = (1 << VPN_BITS) - 1;
/// 每个页表页的表项数
pub const PT_ENTRIES: usize = 1 << VPN_BITS;
/// 三级索引在虚拟地址中的偏移，依次为根、中间、叶子级
pub const VPN_SHIFTS: [usize; 3] = [30, 21, 12];

/// 受管物理内存区域
///
/// 区域 `[base, base + size)` 被切分为 [`PAGE_SIZE`] 大小的帧。
/// 内核镜像占据区域开头的 `kernel_size` 字节，紧随其后的是占用位图本身。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLayout {
    /// 区域起始物理地址
    pub base: usize,
    /// 区域总字节数，必须是页大小的整数倍
    pub size: usize,
    /// 内核镜像占用的字节数（按整页向上取整保留）
    pub kernel_size: usize,
}

impl MemoryLayout {
    /// 创建一个新的区域描述
    pub const fn new(base: usize, size: usize, kernel_size: usize) -> Self {
        Self {
            base,
            size,
            kernel_size,
        }
    }

    /// 校验区域是否满足不变式
    ///
    /// 起始地址与大小必须页对齐，大小非零，且保留帧不能超出区域。
    pub fn validate(&self) -> MmResult<()> {
        if self.size == 0 || self.size % PAGE_SIZE != 0 || self.base % PAGE_SIZE != 0 {
            return Err(MmError::InvalidRegion);
        }
        if self.base.checked_add(self.size).is_none() {
            return Err(MmError::InvalidRegion);
        }
        if self.reserved_frames() > self.total_frames() {
            return Err(MmError::InvalidRegion);
        }
        Ok(())
    }

    /// 区域结束地址（不包含）
    pub const fn end(&self) -> usize {
        self.base + self.size
    }

    /// 区域内的总帧数
    pub const fn total_frames(&self) -> usize {
        self.size / PAGE_SIZE
    }

    /// 内核镜像占用的帧数
    pub const fn kernel_frames(&self) -> usize {
        self.kernel_size.div_ceil(PAGE_SIZE)
    }

    /// 位图字节数：每帧一个 bit
    pub const fn bitmap_bytes(&self) -> usize {
        self.total_frames().div_ceil(8)
    }

    /// 位图占用的帧数
    pub const fn bitmap_frames(&self) -> usize {
        self.bitmap_bytes().div_ceil(PAGE_SIZE)
    }

    /// 初始化时被标记为已分配且永不归还的帧数
    pub const fn reserved_frames(&self) -> usize {
        self.kernel_frames() + self.bitmap_frames()
    }

    /// 地址是否落在区域内
    pub const fn contains(&self, addr: usize) -> bool {
        addr >= self.base && addr < self.end()
    }
}
