//! 内核日志子系统
//!
//! 类似 Linux printk 的日志系统，在裸机环境中使用无锁环形缓冲区。
//!
//! # 组件
//!
//! - [`LogLevel`] - 日志级别（Emergency 到 Debug）
//! - [`LogEntry`] - 定长日志条目
//! - `buffer` - 多生产者单消费者环形缓冲区
//! - `log_core` - 过滤与分发
//! - [`macros`] - `pr_info!`、`pr_err!` 等宏
//!
//! # 双输出
//!
//! 达到全局阈值的日志写入环形缓冲区；达到控制台阈值的日志同时直接打印。
//! 子系统 crate 只依赖 `log` 门面，内核启动时调用 [`init_log_bridge`]
//! 把 `log::info!` 等调用接到这里。
//!
//! # 架构解耦
//!
//! - [`LogContextProvider`]：提供 hart、进程号与时间戳
//! - [`LogOutput`]：提供控制台输出
//!
//! 使用方需要在启动时注册这些 trait 的实现。

#![no_std]

extern crate alloc;

mod buffer;
mod config;
mod entry;
mod level;
mod log_core;
pub mod macros;

pub use config::{
    DEFAULT_CONSOLE_LEVEL, DEFAULT_LOG_LEVEL, GLOBAL_LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH,
};
pub use entry::LogEntry;
pub use level::LogLevel;
pub use log_core::{LogCore, format_log_entry};

use core::sync::atomic::{AtomicPtr, Ordering};

// ========== Trait 定义 ==========

/// 日志上下文提供者
pub trait LogContextProvider: Send + Sync {
    /// 当前 hart
    fn hart_id(&self) -> usize;
    /// 当前运行的进程号（没有则返回 0）
    fn pid(&self) -> u32;
    /// 当前时间戳
    fn timestamp(&self) -> usize;
}

/// 日志输出
pub trait LogOutput: Send + Sync {
    /// 输出字符串到控制台
    fn write_str(&self, s: &str);

    /// 以 `0x` 加 16 位十六进制输出一个数
    ///
    /// 不经过 `core::fmt`，在格式化机制不可用的场合（例如致命陷阱）也能使用。
    fn write_hex(&self, value: u64) {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 18];
        buf[0] = b'0';
        buf[1] = b'x';
        for (i, byte) in buf[2..].iter_mut().enumerate() {
            let shift = (15 - i) * 4;
            *byte = DIGITS[((value >> shift) & 0xf) as usize];
        }
        // 只包含 ASCII
        if let Ok(s) = core::str::from_utf8(&buf) {
            self.write_str(s);
        }
    }
}

// ========== 全局注册机制 ==========

/// 存储 trait object 的胖指针
struct DynPtr {
    data: AtomicPtr<()>,
    vtable: AtomicPtr<()>,
}

impl DynPtr {
    const fn new() -> Self {
        Self {
            data: AtomicPtr::new(core::ptr::null_mut()),
            vtable: AtomicPtr::new(core::ptr::null_mut()),
        }
    }

    fn store(&self, (data, vtable): (*mut (), *mut ())) {
        self.data.store(data, Ordering::Release);
        self.vtable.store(vtable, Ordering::Release);
    }

    fn load(&self) -> Option<(*mut (), *mut ())> {
        let data = self.data.load(Ordering::Acquire);
        let vtable = self.vtable.load(Ordering::Acquire);
        if data.is_null() || vtable.is_null() {
            return None;
        }
        Some((data, vtable))
    }
}

static CONTEXT_PROVIDER: DynPtr = DynPtr::new();
static LOG_OUTPUT: DynPtr = DynPtr::new();

/// 注册日志上下文提供者
///
/// # Safety
///
/// 必须在单线程环境下调用（启动早期）。
pub unsafe fn register_context_provider(provider: &'static dyn LogContextProvider) {
    let ptr: *const dyn LogContextProvider = provider;
    CONTEXT_PROVIDER.store(unsafe { core::mem::transmute::<_, (*mut (), *mut ())>(ptr) });
}

/// 注册日志输出
///
/// # Safety
///
/// 必须在单线程环境下调用（启动早期）。
pub unsafe fn register_log_output(output: &'static dyn LogOutput) {
    let ptr: *const dyn LogOutput = output;
    LOG_OUTPUT.store(unsafe { core::mem::transmute::<_, (*mut (), *mut ())>(ptr) });
}

pub(crate) fn get_context_provider() -> Option<&'static dyn LogContextProvider> {
    let parts = CONTEXT_PROVIDER.load()?;
    // SAFETY: 指针由 register_context_provider 设置，指向 'static 对象
    Some(unsafe { core::mem::transmute::<(*mut (), *mut ()), &'static dyn LogContextProvider>(parts) })
}

/// 已注册的日志输出
///
/// 停机路径直接用它打印，不经过缓冲区。
pub fn get_log_output() -> Option<&'static dyn LogOutput> {
    let parts = LOG_OUTPUT.load()?;
    // SAFETY: 指针由 register_log_output 设置，指向 'static 对象
    Some(unsafe { core::mem::transmute::<(*mut (), *mut ()), &'static dyn LogOutput>(parts) })
}

// ========== 全局单例 ==========

static GLOBAL_LOG: LogCore = LogCore::default();

/// 核心日志实现（由宏调用）
#[doc(hidden)]
pub fn log_impl(level: LogLevel, args: core::fmt::Arguments<'_>) {
    GLOBAL_LOG._log(level, args);
}

/// 检查日志级别是否启用（由宏调用）
#[doc(hidden)]
pub fn is_level_enabled(level: LogLevel) -> bool {
    GLOBAL_LOG.is_level_enabled(level)
}

/// 从缓冲区读取下一个日志条目
pub fn read_log() -> Option<LogEntry> {
    GLOBAL_LOG._read_log()
}

/// 把缓冲区中尚未读取的条目逐条写到 `out`，返回写出的条数
///
/// 低于控制台阈值的日志只进入缓冲区，内核停机前用它把这些条目一并打印出来。
pub fn drain_log(out: &dyn LogOutput) -> usize {
    let mut count = 0;
    while let Some(entry) = read_log() {
        log_core::write_entry(out, &entry);
        count += 1;
    }
    count
}

/// 非破坏性读取
pub fn peek_log(index: usize) -> Option<LogEntry> {
    GLOBAL_LOG._peek_log(index)
}

/// 当前可读取的起始索引
pub fn log_reader_index() -> usize {
    GLOBAL_LOG._log_reader_index()
}

/// 当前写入位置
pub fn log_writer_index() -> usize {
    GLOBAL_LOG._log_writer_index()
}

/// 未读日志条目的数量
pub fn log_len() -> usize {
    GLOBAL_LOG._log_len()
}

/// 未读日志的总字节数（格式化后）
pub fn log_unread_bytes() -> usize {
    GLOBAL_LOG._log_unread_bytes()
}

/// 已丢弃日志的计数
pub fn log_dropped_count() -> usize {
    GLOBAL_LOG._log_dropped_count()
}

/// 设置全局日志级别阈值
///
/// 已安装桥接时同步更新 `log` 门面的最大级别。
pub fn set_global_level(level: LogLevel) {
    GLOBAL_LOG._set_global_level(level);
    log::set_max_level(level.to_level_filter());
}

/// 当前全局日志级别
pub fn get_global_level() -> LogLevel {
    GLOBAL_LOG._get_global_level()
}

/// 设置控制台输出级别阈值
pub fn set_console_level(level: LogLevel) {
    GLOBAL_LOG._set_console_level(level);
}

/// 当前控制台输出级别
pub fn get_console_level() -> LogLevel {
    GLOBAL_LOG._get_console_level()
}

// ========== log 门面桥接 ==========

/// 把 `log` crate 的记录转发到全局 [`LogCore`]
struct LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        is_level_enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record<'_>) {
        let level = record.level().into();
        if is_level_enabled(level) {
            log_impl(level, *record.args());
        }
    }

    fn flush(&self) {}
}

static LOG_BRIDGE: LogBridge = LogBridge;

/// 安装 `log` 门面桥接
///
/// 只能成功一次，重复调用返回错误。
pub fn init_log_bridge() -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOG_BRIDGE)?;
    log::set_max_level(get_global_level().to_level_filter());
    Ok(())
}
