//! 内核配置常量
//!
//! 对应 QEMU `virt` 机器，内核由 OpenSBI 以 S 态加载到 0x8020_0000。

use klog::LogLevel;

/// 物理内存起始地址
pub const MEMORY_BASE: usize = 0x8000_0000;
/// 物理内存大小
pub const MEMORY_SIZE: usize = 128 * 1024 * 1024;
/// 物理内存结束地址（不包含）
pub const MEMORY_END: usize = MEMORY_BASE + MEMORY_SIZE;
/// 区域开头至少保留给固件与内核镜像的字节数
pub const KERNEL_RESERVED: usize = 1024 * 1024;

/// 页大小
pub const PAGE_SIZE: usize = mm::PAGE_SIZE;

/// 内核堆大小
pub const KERNEL_HEAP_SIZE: usize = 1024 * 1024;

/// 16550 UART 的 MMIO 基址
pub const UART_BASE: usize = 0x1000_0000;

/// 时间片（time CSR 的滴答数）
pub const TIMER_QUANTUM: u64 = trap::DEFAULT_QUANTUM;

/// 进程表容量
pub const NPROC: usize = task::NPROC;
/// 进程代码页映射到的虚拟地址
pub const USER_ENTRY_VA: usize = 0x1000;
/// 进程设备映射的虚拟地址，与 UART 物理地址相同
pub const USER_DEVICE_VA: usize = UART_BASE;
/// 进程私有栈所在的虚拟页
pub const USER_STACK_VA: usize = 0x2000;

/// 启动后的全局日志级别
pub const LOG_LEVEL: LogLevel = LogLevel::Info;
/// 启动后的控制台日志级别
pub const CONSOLE_LOG_LEVEL: LogLevel = LogLevel::Info;
