//! 内存管理子系统
//!
//! 提供地址抽象、物理帧分配、Sv39 页表项和地址空间构建功能。
//!
//! # 组成
//!
//! - [`address`]：物理/虚拟地址与物理页号
//! - [`frame_allocator`]：基于位图的物理帧分配器
//! - [`page_table`]：Sv39 页表项、页表页以及地址空间构建器
//! - [`phys`]：访问物理帧内容的抽象（恒等映射 / 帧 arena）
//!
//! # 所有权
//!
//! 本 crate 不持有任何全局状态：分配器与物理内存访问器都由调用方拥有，
//! 以引用的形式传入每个操作，修改点因此都是显式可审计的。

#![no_std]

extern crate alloc;

mod config;
mod error;

pub mod address;
pub mod frame_allocator;
pub mod page_table;
pub mod phys;

pub use config::{
    MemoryLayout, PAGE_SHIFT, PAGE_SIZE, PT_ENTRIES, PTE_PPN_SHIFT, VPN_BITS, VPN_MASK, VPN_SHIFTS,
};
pub use error::{MmError, MmResult};

// Re-export 常用类型
pub use address::{AlignOps, Paddr, Ppn, UsizeConvert, Vaddr};
pub use frame_allocator::FrameAllocator;
pub use page_table::{AddressSpace, PageTable, PageTableEntry, PteFlags};
pub use phys::{DirectMap, FrameArena, PhysMemory};
