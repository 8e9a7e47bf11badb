//! 架构相关操作的 Mock 实现
//!
//! 中断使能位按线程保存：cargo test 并行运行各个测试，
//! 共享一个全局标志会让断言互相干扰。

use std::cell::Cell;

thread_local! {
    static INTERRUPTS: Cell<bool> = const { Cell::new(true) };
}

/// SIE 位
const SSTATUS_SIE: usize = 0x2;

/// Mock 架构操作
pub struct MockArchOps;

impl MockArchOps {
    pub const fn new() -> Self {
        Self
    }

    /// # Safety
    /// 与真实实现保持同样的签名；mock 本身没有前置条件
    pub unsafe fn read_and_disable_interrupts(&self) -> usize {
        if INTERRUPTS.with(|c| c.replace(false)) {
            SSTATUS_SIE
        } else {
            0
        }
    }

    /// # Safety
    /// 同上
    pub unsafe fn restore_interrupts(&self, flags: usize) {
        INTERRUPTS.with(|c| c.set(flags & SSTATUS_SIE != 0));
    }

    pub fn sstatus_sie(&self) -> usize {
        SSTATUS_SIE
    }

    /// 当前线程视角下中断是否开启
    pub fn interrupts_enabled(&self) -> bool {
        INTERRUPTS.with(|c| c.get())
    }
}

impl Default for MockArchOps {
    fn default() -> Self {
        Self::new()
    }
}

/// 全局 Mock 实例
pub static MOCK_ARCH_OPS: MockArchOps = MockArchOps::new();
