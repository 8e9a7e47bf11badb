//! 中断保护器
//!
//! 基于 RAII 实现中断保护，在创建时禁用中断，销毁时恢复。
//!
//! 内核只运行在单核上，禁用中断即可排除“任务 vs 本地中断”的并发。

use crate::arch_ops;
use core::ops::Drop;

/// 中断保护器，基于 RAII 实现中断保护。
///
/// 在创建时原子地禁用中断并保存之前的状态；
/// 在销毁时自动恢复之前的中断状态。
///
/// # 示例
/// ```ignore
/// {
///     let guard = IntrGuard::new(); // 禁用中断
///     // 临界区代码
/// } // 离开作用域，自动恢复中断状态
/// ```
pub struct IntrGuard {
    flags: usize,
}

impl IntrGuard {
    /// 原子地禁用中断并返回一个 IntrGuard 实例。
    pub fn new() -> Self {
        // SAFETY: 返回的 flags 只会在 drop 中原样交还给 restore_interrupts
        let flags = unsafe { arch_ops().read_and_disable_interrupts() };
        IntrGuard { flags }
    }

    /// 进入临界区前中断是否处于启用状态
    pub fn was_enabled(&self) -> bool {
        self.flags & arch_ops().sstatus_sie() != 0
    }
}

impl Default for IntrGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntrGuard {
    fn drop(&mut self) {
        // SAFETY: flags 是在创建 IntrGuard 时保存的
        unsafe { arch_ops().restore_interrupts(self.flags) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_arch::{interrupts_enabled, setup};

    #[test]
    fn test_guard_disables_and_restores() {
        setup();
        assert!(interrupts_enabled());
        {
            let guard = IntrGuard::new();
            assert!(guard.was_enabled());
            assert!(!interrupts_enabled());
        }
        assert!(interrupts_enabled());
    }

    #[test]
    fn test_nested_guard_keeps_outer_state() {
        setup();
        let outer = IntrGuard::new();
        {
            let inner = IntrGuard::new();
            assert!(!inner.was_enabled());
        }
        // 内层恢复的是“已关闭”
        assert!(!interrupts_enabled());
        drop(outer);
        assert!(interrupts_enabled());
    }
}
