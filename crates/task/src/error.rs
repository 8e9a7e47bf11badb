//! 进程管理错误类型

use core::fmt;
use mm::MmError;

/// 进程创建中可能发生的错误
///
/// 前两者是可恢复的：创建被放弃，调用方决定是否继续。
/// `Memory` 包装的错误是否致命由 [`MmError::is_fatal`] 决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    /// 进程表已满
    NoProcessSlot,
    /// 内核栈、根页表或中间页表分配失败
    OutOfMemory,
    /// 其它内存管理错误
    Memory(MmError),
}

impl From<MmError> for TaskError {
    fn from(err: MmError) -> Self {
        match err {
            MmError::OutOfMemory => TaskError::OutOfMemory,
            other => TaskError::Memory(other),
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::NoProcessSlot => write!(f, "no available process slot"),
            TaskError::OutOfMemory => write!(f, "out of memory while creating process"),
            TaskError::Memory(err) => write!(f, "memory error: {}", err),
        }
    }
}

/// 进程管理操作的结果类型
pub type TaskResult<T> = Result<T, TaskError>;
