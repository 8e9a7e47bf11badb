//! CLINT 定时器的 Mock 实现
//!
//! 模拟 mtime 计数器与每个 hart 的 mtimecmp 比较寄存器。

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Mock CLINT
pub struct MockClint {
    mtime: AtomicU64,
    comparators: Mutex<Vec<u64>>,
    writes: AtomicUsize,
}

impl MockClint {
    /// 创建有 `harts` 个比较寄存器的 CLINT，mtime 从 `start` 开始
    pub fn new(harts: usize, start: u64) -> Self {
        Self {
            mtime: AtomicU64::new(start),
            comparators: Mutex::new(vec![u64::MAX; harts]),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn mtime(&self) -> u64 {
        self.mtime.load(Ordering::SeqCst)
    }

    /// 让时间前进 `ticks`
    pub fn advance(&self, ticks: u64) {
        self.mtime.fetch_add(ticks, Ordering::SeqCst);
    }

    /// 写入 mtimecmp
    ///
    /// # Panics
    /// hart 超出范围时 panic
    pub fn set_mtimecmp(&self, hart: usize, value: u64) {
        self.comparators.lock().unwrap()[hart] = value;
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn mtimecmp(&self, hart: usize) -> u64 {
        self.comparators.lock().unwrap()[hart]
    }

    /// 比较寄存器被写入的总次数
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// `hart` 的定时器中断是否处于挂起状态
    pub fn pending(&self, hart: usize) -> bool {
        self.mtime() >= self.mtimecmp(hart)
    }
}
