//! 页表模块
//!
//! 本模块提供 Sv39 三级页表的表项编码、页表页结构以及地址空间构建器。
//!
//! 页表页之间通过表项中的物理页号互相引用，而不是裸指针；
//! 访问某一级页表总是经由 [`PhysMemory`](crate::phys::PhysMemory) 按帧地址取得，
//! 因此遍历过程中不存在悬垂指针或生命周期问题。
mod address_space;
mod entry;
mod table;

pub use address_space::AddressSpace;
pub use entry::{PageTableEntry, PteFlags};
pub use table::PageTable;
