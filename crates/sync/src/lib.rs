//! 同步原语
//!
//! 向其它内核模块提供基本的锁和单核内部可变性容器：
//!
//! - [`IntrGuard`]：RAII 中断保护
//! - [`SpinLock`]：关中断的自旋锁（基于 `lock_api`）
//! - [`UpCell`]：单核下的共享可变状态，借用冲突会立即 panic 而不是死锁
//!
//! # 架构依赖
//!
//! 此 crate 通过 `ArchOps` trait 抽象架构相关操作。
//! 使用前必须调用 `register_arch_ops` 注册实现。

#![no_std]

mod intr_guard;
mod raw_spin_lock;
mod spin_lock;
mod up_cell;

pub use intr_guard::*;
pub use raw_spin_lock::*;
pub use spin_lock::*;
pub use up_cell::*;

use core::sync::atomic::{AtomicUsize, Ordering};

/// 架构相关操作的 trait
///
/// 由 os crate 实现并注册，提供中断控制
pub trait ArchOps: Send + Sync {
    /// 读取并禁用中断，返回之前的状态
    ///
    /// # Safety
    /// 调用者必须确保在适当的上下文中调用
    unsafe fn read_and_disable_interrupts(&self) -> usize;

    /// 恢复中断状态
    ///
    /// # Safety
    /// flags 必须是之前 read_and_disable_interrupts 返回的值
    unsafe fn restore_interrupts(&self, flags: usize);

    /// 获取 SSTATUS_SIE 常量（中断使能位）
    fn sstatus_sie(&self) -> usize;
}

/// 全局架构操作实例（存储 fat pointer 的两个部分）
static ARCH_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static ARCH_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册架构操作实现
///
/// # Safety
/// 必须在单线程环境下调用。重复注册会覆盖之前的实现。
pub unsafe fn register_arch_ops(ops: &'static dyn ArchOps) {
    let ptr = ops as *const dyn ArchOps;
    // SAFETY: fat pointer 的布局是 (data, vtable)
    let (data, vtable) = unsafe { core::mem::transmute::<*const dyn ArchOps, (usize, usize)>(ptr) };
    ARCH_OPS_DATA.store(data, Ordering::Release);
    ARCH_OPS_VTABLE.store(vtable, Ordering::Release);
}

/// 是否已经注册了架构操作
pub fn arch_ops_registered() -> bool {
    ARCH_OPS_DATA.load(Ordering::Acquire) != 0
}

/// 获取架构操作实例
#[inline]
pub(crate) fn arch_ops() -> &'static dyn ArchOps {
    let data = ARCH_OPS_DATA.load(Ordering::Acquire);
    let vtable = ARCH_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("sync: ArchOps not registered, call register_arch_ops first");
    }
    // SAFETY: data 和 vtable 是通过 register_arch_ops 设置的有效指针
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn ArchOps>((data, vtable)) }
}

#[cfg(test)]
pub(crate) mod test_arch {
    use super::ArchOps;
    use test_support::mock::arch::MOCK_ARCH_OPS;

    /// 把 test-support 的 mock 接到本 crate 的 trait 上
    pub struct TestArch;

    impl ArchOps for TestArch {
        unsafe fn read_and_disable_interrupts(&self) -> usize {
            unsafe { MOCK_ARCH_OPS.read_and_disable_interrupts() }
        }

        unsafe fn restore_interrupts(&self, flags: usize) {
            unsafe { MOCK_ARCH_OPS.restore_interrupts(flags) }
        }

        fn sstatus_sie(&self) -> usize {
            MOCK_ARCH_OPS.sstatus_sie()
        }
    }

    static TEST_ARCH: TestArch = TestArch;

    /// 注册 mock；各测试可重复调用
    pub fn setup() {
        // SAFETY: 每次注册的都是同一个实例，重复写入相同的值不会产生中间态
        unsafe { super::register_arch_ops(&TEST_ARCH) };
    }

    pub fn interrupts_enabled() -> bool {
        MOCK_ARCH_OPS.interrupts_enabled()
    }
}
