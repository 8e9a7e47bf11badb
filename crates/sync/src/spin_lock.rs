//! 自旋锁封装
//!
//! 提供对数据的互斥访问的自旋锁类型。

use crate::raw_spin_lock::RawSpinLock;

/// 提供对数据的互斥访问的自旋锁
///
/// # 示例
/// ```ignore
/// static FRAMES: SpinLock<Option<FrameAllocator>> = SpinLock::new(None);
/// {
///     let mut guard = FRAMES.lock(); // 获取锁，禁用中断
///     // 访问和修改数据
/// } // 离开作用域，自动释放锁并恢复中断状态
/// ```
///
/// # 注意
/// SpinLock 不是可重入的。当持有锁时，尝试再次获取锁将导致死锁。
/// 持有锁时不能执行上下文切换。
pub type SpinLock<T> = lock_api::Mutex<RawSpinLock, T>;

/// SpinLock 的 RAII 保护器
pub type SpinLockGuard<'a, T> = lock_api::MutexGuard<'a, RawSpinLock, T>;
