//! 单核内部可变性容器
//!
//! 内核只在一个 hart 上运行，且在 S 态关闭中断，
//! 因此全局状态不需要锁，只需要保证同一时刻只有一个可变借用。
//! [`UpCell`] 把这一点交给 `RefCell` 在运行时检查：
//! 重入借用会立即 panic，而不是静默地产生别名。

use core::cell::{Ref, RefCell, RefMut};

/// 单核下可放入 `static` 的共享可变容器
pub struct UpCell<T> {
    inner: RefCell<T>,
}

// SAFETY: 只在单核、内核态不可被中断的前提下使用
unsafe impl<T> Sync for UpCell<T> {}

impl<T> UpCell<T> {
    /// 创建容器
    pub const fn new(value: T) -> Self {
        Self {
            inner: RefCell::new(value),
        }
    }

    /// 取得独占访问
    ///
    /// 已有借用存活时 panic。
    pub fn exclusive_access(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    /// 取得共享访问
    pub fn access(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    /// 尝试取得共享访问，已被独占借用时返回 `None`
    pub fn try_access(&self) -> Option<Ref<'_, T>> {
        self.inner.try_borrow().ok()
    }

    /// 当前是否存在任何借用
    pub fn is_borrowed(&self) -> bool {
        self.inner.try_borrow_mut().is_err()
    }
}
