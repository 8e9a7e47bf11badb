//! 内存管理错误类型

use core::fmt;

/// 帧分配与地址空间操作中可能发生的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// 没有空闲物理帧（包括页表遍历中无法分配中间页表）
    OutOfMemory,
    /// 释放的地址不在受管区域内，或属于保留帧
    InvalidFree(usize),
    /// 释放的地址没有按页对齐
    MisalignedFree(usize),
    /// 物理内存区域描述不合法
    InvalidRegion,
}

impl MmError {
    /// 是否属于簿记损坏类错误
    ///
    /// 这类错误不可恢复，调用方必须停机。
    pub fn is_fatal(&self) -> bool {
        matches!(self, MmError::InvalidFree(_) | MmError::MisalignedFree(_))
    }
}

impl fmt::Display for MmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MmError::OutOfMemory => write!(f, "out of physical frames"),
            MmError::InvalidFree(addr) => {
                write!(f, "free of {:#018x} outside managed frames", addr)
            }
            MmError::MisalignedFree(addr) => {
                write!(f, "free of non-page-aligned address {:#018x}", addr)
            }
            MmError::InvalidRegion => write!(f, "invalid physical memory region"),
        }
    }
}

/// 内存管理操作的结果类型
pub type MmResult<T> = Result<T, MmError>;
