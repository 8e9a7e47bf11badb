//! 体系结构相关的模块
//!
//! 架构条件编译集中在本模块；`arch/` 外部代码通过 `crate::arch::*`
//! 访问寄存器、陷阱入口与上下文切换，不直接依赖 `riscv` crate。

#[cfg(target_arch = "riscv64")]
mod riscv;

#[cfg(target_arch = "riscv64")]
pub use riscv::{boot, constant, intr, switch, timer, trap};

/// sync crate 的 ArchOps 实现
struct SyncArchOps;

impl sync::ArchOps for SyncArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        unsafe { self::intr::read_and_disable_interrupts() }
    }

    unsafe fn restore_interrupts(&self, flags: usize) {
        unsafe { self::intr::restore_interrupts(flags) }
    }

    fn sstatus_sie(&self) -> usize {
        self::constant::SSTATUS_SIE
    }
}

/// 全局 ArchOps 实例
static SYNC_ARCH_OPS: SyncArchOps = SyncArchOps;

/// 初始化 sync crate 的架构操作
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn init_sync_arch_ops() {
    unsafe { sync::register_arch_ops(&SYNC_ARCH_OPS) };
}
