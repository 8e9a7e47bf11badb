//! 帧分配器模块
//!
//! 本模块提供物理内存帧的分配和回收功能。
//!
//! ## 分配策略（位图）
//!
//! 分配器使用位图（bitmap）跟踪每个物理帧的分配状态：
//!
//! - **bitmap**：每个 bit 表示一个物理帧（0=空闲，1=已分配），按帧号索引
//! - 位图使用 `Vec<u64>` 存储，分配时可以整字跳过全满的 64 帧
//!
//! 分配总是从帧号 0 开始按升序扫描，返回第一个空闲帧（低地址优先，
//! 结果完全确定）。释放时直接清除对应 bit，O(1) 操作。
//!
//! ## 保留帧
//!
//! [`FrameAllocator::init`] 会把内核镜像所在的低端帧，以及紧随其后、
//! 按位图字节数向上取整计算出的位图帧标记为已分配。这些帧永远不会被
//! [`FrameAllocator::allocate`] 返回，也不能被释放。
//!
//! ## 错误分类
//!
//! - 无空闲帧：返回 [`MmError::OutOfMemory`]，调用方必须检查
//! - 释放区域外 / 保留帧：[`MmError::InvalidFree`]
//! - 释放未对齐地址：[`MmError::MisalignedFree`]
//!
//! 后两者属于簿记损坏（[`MmError::is_fatal`]），上层应当停机。
//! 重复释放不做检测。

use crate::address::{AlignOps, Paddr, UsizeConvert};
use crate::config::{MemoryLayout, PAGE_SIZE};
use crate::error::{MmError, MmResult};
use alloc::vec::Vec;

/// 物理帧分配器。
/// 采用位图策略跟踪每个物理帧的分配状态。
#[derive(Debug)]
pub struct FrameAllocator {
    /// 受管物理内存区域
    layout: MemoryLayout,
    /// 位图数据（每个 bit 表示一个帧：0=空闲，1=已分配）
    bitmap: Vec<u64>,
    /// 总帧数
    total_frames: usize,
    /// 当前被标记为已分配的帧数（含保留帧）
    allocated_count: usize,
}

impl FrameAllocator {
    /// 为给定区域创建分配器。
    ///
    /// 位图在此处按区域大小分配并清零，但保留帧要等到 [`init`](Self::init) 才会标记。
    pub fn new(layout: MemoryLayout) -> MmResult<Self> {
        layout.validate()?;
        let total_frames = layout.total_frames();
        Ok(FrameAllocator {
            layout,
            bitmap: alloc::vec![0u64; total_frames.div_ceil(64)],
            total_frames,
            allocated_count: 0,
        })
    }

    /// 初始化位图。
    ///
    /// 先清零整个位图，再标记内核镜像帧与位图自身占用的帧。
    /// 不是幂等的：在已经分配出帧之后再次调用会丢失这些帧的记录。
    pub fn init(&mut self) {
        self.bitmap.fill(0);
        self.allocated_count = 0;

        // 内核镜像占据最低的若干帧，位图紧随其后
        for idx in 0..self.layout.reserved_frames() {
            self.mark_allocated(idx);
        }
        self.allocated_count = self.layout.reserved_frames();

        log::info!(
            "mm: frame allocator initialized, {} frames at {:#x}, {} reserved",
            self.total_frames,
            self.layout.base,
            self.layout.reserved_frames()
        );
    }

    /// 检查帧是否空闲
    #[inline]
    fn is_free(&self, frame_idx: usize) -> bool {
        let word_idx = frame_idx / 64;
        let bit_idx = frame_idx % 64;
        (self.bitmap[word_idx] & (1u64 << bit_idx)) == 0
    }

    /// 标记帧为已分配
    #[inline]
    fn mark_allocated(&mut self, frame_idx: usize) {
        let word_idx = frame_idx / 64;
        let bit_idx = frame_idx % 64;
        self.bitmap[word_idx] |= 1u64 << bit_idx;
    }

    /// 标记帧为空闲
    #[inline]
    fn mark_free(&mut self, frame_idx: usize) {
        let word_idx = frame_idx / 64;
        let bit_idx = frame_idx % 64;
        self.bitmap[word_idx] &= !(1u64 << bit_idx);
    }

    #[inline]
    fn frame_addr(&self, frame_idx: usize) -> Paddr {
        Paddr(self.layout.base + frame_idx * PAGE_SIZE)
    }

    /// 分配一个物理帧。
    /// 按帧号升序查找第一个空闲位，返回对应帧的起始物理地址。
    pub fn allocate(&mut self) -> MmResult<Paddr> {
        for (word_idx, &word) in self.bitmap.iter().enumerate() {
            // 快速跳过全满的 u64
            if word == u64::MAX {
                continue;
            }

            // 找到第一个空闲位（trailing_zeros 找最低位的 0）
            let frame_idx = word_idx * 64 + (!word).trailing_zeros() as usize;
            // 最后一个字的高位可能超出区域
            if frame_idx >= self.total_frames {
                break;
            }

            self.mark_allocated(frame_idx);
            self.allocated_count += 1;
            return Ok(self.frame_addr(frame_idx));
        }

        log::warn!("mm: no free frames left");
        Err(MmError::OutOfMemory)
    }

    /// 回收一个物理帧。
    ///
    /// 空地址只记录警告并忽略。区域外、保留帧或未对齐的地址说明簿记已经损坏，
    /// 返回致命错误。重复释放与正常释放不做区分。
    pub fn free(&mut self, addr: Paddr) -> MmResult<()> {
        if addr.as_usize() == 0 {
            log::warn!("mm: free called with null address");
            return Ok(());
        }
        if !self.layout.contains(addr.as_usize()) {
            log::error!("mm: attempt to free {:#x} outside managed region", addr);
            return Err(MmError::InvalidFree(addr.as_usize()));
        }
        if !addr.is_page_aligned() {
            log::error!("mm: attempt to free non-page-aligned address {:#x}", addr);
            return Err(MmError::MisalignedFree(addr.as_usize()));
        }

        let frame_idx = (addr.as_usize() - self.layout.base) / PAGE_SIZE;
        if frame_idx < self.layout.reserved_frames() {
            log::error!("mm: attempt to free reserved frame {:#x}", addr);
            return Err(MmError::InvalidFree(addr.as_usize()));
        }

        if !self.is_free(frame_idx) {
            self.allocated_count -= 1;
        }
        self.mark_free(frame_idx);
        Ok(())
    }

    /// 地址所在的帧当前是否已分配
    pub fn is_allocated(&self, addr: Paddr) -> bool {
        if !self.layout.contains(addr.as_usize()) {
            return false;
        }
        !self.is_free((addr.as_usize() - self.layout.base) / PAGE_SIZE)
    }

    /// 地址是否属于受管区域
    pub fn contains(&self, addr: Paddr) -> bool {
        self.layout.contains(addr.as_usize())
    }

    /// 受管区域描述
    pub fn layout(&self) -> &MemoryLayout {
        &self.layout
    }

    /// 获取总的物理帧数
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// 获取保留帧数（内核镜像 + 位图）
    pub fn reserved_frames(&self) -> usize {
        self.layout.reserved_frames()
    }

    /// 获取已分配的帧数（含保留帧）
    pub fn allocated_frames(&self) -> usize {
        self.allocated_count
    }

    /// 获取空闲的帧数
    pub fn free_frames(&self) -> usize {
        self.total_frames - self.allocated_count
    }

    /// 获取帧分配器的当前状态
    /// # 返回值
    /// - 总帧数
    /// - 已分配的帧数
    /// - 空闲的帧数
    pub fn stats(&self) -> (usize, usize, usize) {
        (
            self.total_frames,
            self.allocated_count,
            self.total_frames - self.allocated_count,
        )
    }
}
