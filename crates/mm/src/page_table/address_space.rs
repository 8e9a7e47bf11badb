//! 地址空间构建器
//!
//! 一个地址空间由根页表帧标识，并拥有从根出发可达的全部页表帧。
//! 中间级页表在第一次被引用时才分配。
//!
//! ## 部分失败
//!
//! [`AddressSpace::map`] 在遍历途中任何一次分配失败都会返回
//! [`MmError::OutOfMemory`]，此前已经挂上的中间页表不会回滚，
//! 地址空间保持部分填充的状态。
//!
//! ## 重复映射
//!
//! 对同一虚拟地址再次映射会直接覆盖叶子表项，不会回收原先映射的帧。

use super::{PageTable, PageTableEntry, PteFlags};
use crate::address::{AlignOps, Paddr, Ppn, UsizeConvert, Vaddr};
use crate::config::PAGE_SIZE;
use crate::error::MmResult;
use crate::frame_allocator::FrameAllocator;
use crate::phys::PhysMemory;

/// satp 中 Sv39 模式的编码
const SATP_MODE_SV39: usize = 8 << 60;

/// 三级页表描述的地址空间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressSpace {
    root: Paddr,
}

/// 分配一帧并清零，作为新的页表页
fn create_table(frames: &mut FrameAllocator, mem: &mut impl PhysMemory) -> MmResult<Paddr> {
    let frame = frames.allocate()?;
    mem.zero_frame(frame);
    Ok(frame)
}

/// 取得 `table[index]` 指向的下一级页表，不存在时分配一个新的
fn next_level(
    frames: &mut FrameAllocator,
    mem: &mut impl PhysMemory,
    table: Paddr,
    index: usize,
) -> MmResult<Paddr> {
    let entry = mem.table(table)[index];
    if entry.is_valid() {
        return Ok(entry.frame());
    }
    let frame = create_table(frames, mem)?;
    mem.table_mut(table)[index] = PageTableEntry::new(frame, PteFlags::V);
    Ok(frame)
}

impl AddressSpace {
    /// 分配并清零一帧作为新的根页表
    pub fn create(frames: &mut FrameAllocator, mem: &mut impl PhysMemory) -> MmResult<Self> {
        let root = create_table(frames, mem)?;
        log::debug!("mm: created address space, root {:#x}", root);
        Ok(Self { root })
    }

    /// 由已有的根页表帧构造
    pub fn from_root(root: Paddr) -> Self {
        Self { root }
    }

    /// 根页表帧
    pub fn root(&self) -> Paddr {
        self.root
    }

    /// 写入 satp 寄存器的值（Sv39，ASID 为 0）
    pub fn satp(&self) -> usize {
        SATP_MODE_SV39 | Ppn::from_addr_floor(self.root).as_usize()
    }

    /// 将虚拟页 `va` 映射到物理帧 `pa`
    ///
    /// 依次经过根、中间、叶子三级页表，缺失的中间级按需分配并清零，
    /// 最后在叶子表项写入 `pa` 的帧号以及 `flags | V`。
    pub fn map(
        &self,
        frames: &mut FrameAllocator,
        mem: &mut impl PhysMemory,
        va: Vaddr,
        pa: Paddr,
        flags: PteFlags,
    ) -> MmResult<()> {
        let [vpn2, vpn1, vpn0] = va.indices();
        let mid = next_level(frames, mem, self.root, vpn2)?;
        let leaf = next_level(frames, mem, mid, vpn1)?;

        let slot = &mut mem.table_mut(leaf)[vpn0];
        if slot.is_valid() {
            log::debug!("mm: remapping {:#x}, previous frame {:#x}", va, slot.frame());
        }
        *slot = PageTableEntry::new(pa, flags | PteFlags::V);
        Ok(())
    }

    /// 将 `[va, va + len)` 逐页映射到 `[pa, pa + len)`
    ///
    /// `len` 向上取整到整页。失败时已完成的页保持映射。
    pub fn map_range(
        &self,
        frames: &mut FrameAllocator,
        mem: &mut impl PhysMemory,
        va: Vaddr,
        pa: Paddr,
        len: usize,
        flags: PteFlags,
    ) -> MmResult<()> {
        let va = va.align_down_to_page();
        let pa = pa.align_down_to_page();
        for offset in (0..len.next_multiple_of(PAGE_SIZE)).step_by(PAGE_SIZE) {
            self.map(frames, mem, va + offset, pa + offset, flags)?;
        }
        Ok(())
    }

    /// 查找 `va` 的叶子表项
    ///
    /// 使用与 [`map`](Self::map) 相同的解码方式逐级下降，任何一级无效则返回 `None`。
    pub fn walk(&self, mem: &impl PhysMemory, va: Vaddr) -> Option<PageTableEntry> {
        let mut table: &PageTable = mem.table(self.root);
        let indices = va.indices();
        for &index in &indices[..2] {
            let entry = table[index];
            if !entry.is_valid() {
                return None;
            }
            table = mem.table(entry.frame());
        }
        let leaf = table[indices[2]];
        leaf.is_valid().then_some(leaf)
    }

    /// 将虚拟地址翻译为物理地址（含页内偏移）
    pub fn translate(&self, mem: &impl PhysMemory, va: Vaddr) -> Option<Paddr> {
        self.walk(mem, va)
            .map(|leaf| leaf.frame() + va.page_offset())
    }
}
