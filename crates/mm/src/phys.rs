//! 物理帧内容访问
//!
//! 页表遍历需要把帧地址解释为页表页。这一步与运行环境相关：
//!
//! - 内核中物理内存是恒等映射（或带固定偏移的线性映射）的，
//!   直接把地址转换为指针即可，见 [`DirectMap`]；
//! - 主机测试中没有真实的物理内存，使用按帧号索引的 [`FrameArena`]。
//!
//! 两者实现同一个 [`PhysMemory`] trait，地址空间构建器对此无感知。

use crate::address::{AlignOps, Paddr, UsizeConvert};
use crate::config::PAGE_SIZE;
use crate::page_table::PageTable;
use alloc::boxed::Box;
use alloc::collections::BTreeMap;

/// 物理帧访问接口
pub trait PhysMemory {
    /// 将整帧清零
    fn zero_frame(&mut self, frame: Paddr);

    /// 将帧解释为页表页（只读）
    fn table(&self, frame: Paddr) -> &PageTable;

    /// 将帧解释为页表页（可写）
    fn table_mut(&mut self, frame: Paddr) -> &mut PageTable;
}

/// 线性映射的物理内存
///
/// 虚拟地址 = 物理地址 + `offset`。恒等映射时 `offset` 为 0。
#[derive(Debug)]
pub struct DirectMap {
    offset: usize,
}

impl DirectMap {
    /// 创建线性映射访问器
    ///
    /// # Safety
    /// 调用者必须保证所有会被访问的帧都已按 `offset` 映射到当前地址空间，
    /// 且这些帧不会同时被其它代码以不兼容的方式访问。
    pub const unsafe fn new(offset: usize) -> Self {
        Self { offset }
    }

    #[inline]
    fn ptr(&self, frame: Paddr) -> *mut u8 {
        debug_assert!(frame.is_page_aligned());
        (frame.as_usize() + self.offset) as *mut u8
    }
}

impl PhysMemory for DirectMap {
    fn zero_frame(&mut self, frame: Paddr) {
        // SAFETY: 由 DirectMap::new 的调用者保证帧已映射且可写
        unsafe { core::ptr::write_bytes(self.ptr(frame), 0, PAGE_SIZE) };
    }

    fn table(&self, frame: Paddr) -> &PageTable {
        // SAFETY: 帧按页对齐，PageTable 恰好占满一帧且对齐为 4096
        unsafe { &*(self.ptr(frame) as *const PageTable) }
    }

    fn table_mut(&mut self, frame: Paddr) -> &mut PageTable {
        // SAFETY: 同上，且 &mut self 保证此访问器内没有其它借用
        unsafe { &mut *(self.ptr(frame) as *mut PageTable) }
    }
}

/// 按帧号索引的帧 arena
///
/// 帧在第一次被写入时才分配后备存储，未触碰过的帧读出来全为零。
#[derive(Default)]
pub struct FrameArena {
    frames: BTreeMap<usize, Box<PageTable>>,
}

static ZERO_TABLE: PageTable = PageTable::empty();

impl FrameArena {
    /// 创建空 arena
    pub fn new() -> Self {
        Self::default()
    }

    /// 已经拥有后备存储的帧数
    pub fn touched_frames(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    fn frame_number(frame: Paddr) -> usize {
        debug_assert!(frame.is_page_aligned());
        frame.as_usize() / PAGE_SIZE
    }
}

impl PhysMemory for FrameArena {
    fn zero_frame(&mut self, frame: Paddr) {
        *self.table_mut(frame) = PageTable::empty();
    }

    fn table(&self, frame: Paddr) -> &PageTable {
        self.frames
            .get(&Self::frame_number(frame))
            .map(|t| &**t)
            .unwrap_or(&ZERO_TABLE)
    }

    fn table_mut(&mut self, frame: Paddr) -> &mut PageTable {
        self.frames
            .entry(Self::frame_number(frame))
            .or_insert_with(|| Box::new(PageTable::empty()))
    }
}
