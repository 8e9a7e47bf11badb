//! 地址模块
//!
//! 此模块提供物理地址、虚拟地址与物理页号的强类型封装。
//!
//! - [`Paddr`] - 物理地址
//! - [`Vaddr`] - 虚拟地址（Sv39，低 39 位有效）
//! - [`Ppn`] - 物理页号
//!
//! 两个操作 Trait：
//!
//! - [`UsizeConvert`] - 在类型和 usize 之间进行转换
//! - [`AlignOps`] - 页对齐操作
pub mod operations;
pub mod page_num;
pub mod types;

pub use operations::{AlignOps, UsizeConvert};
pub use page_num::Ppn;
pub use types::{Paddr, Vaddr};
