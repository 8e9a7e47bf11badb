//! 日志系统核心实现
//!
//! 所有日志状态集中在 `LogCore` 中：全局单例供宏使用，测试可以独立实例化。

use super::buffer::GlobalLogBuffer;
use super::config::{DEFAULT_CONSOLE_LEVEL, DEFAULT_LOG_LEVEL};
use super::entry::LogEntry;
use super::level::LogLevel;
use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU8, Ordering};

/// 核心日志系统
///
/// 封装了环形缓冲区和两个过滤阈值，所有方法都只使用原子操作。
pub struct LogCore {
    buffer: GlobalLogBuffer,
    /// 缓冲阈值
    global_level: AtomicU8,
    /// 控制台阈值
    console_level: AtomicU8,
}

impl LogCore {
    /// 使用默认级别创建，可用于 `static` 初始化
    pub const fn default() -> Self {
        Self::new(DEFAULT_LOG_LEVEL, DEFAULT_CONSOLE_LEVEL)
    }

    /// 使用给定级别创建
    pub const fn new(global_level: LogLevel, console_level: LogLevel) -> Self {
        Self {
            buffer: GlobalLogBuffer::new(),
            global_level: AtomicU8::new(global_level as u8),
            console_level: AtomicU8::new(console_level as u8),
        }
    }

    /// 记录一条日志
    ///
    /// 先按全局阈值过滤，再向已注册的上下文提供者取 hart、进程号和时间戳，
    /// 写入缓冲区；达到控制台阈值时同时打印。
    pub fn _log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.is_level_enabled(level) {
            return;
        }

        let (hart_id, pid, timestamp) = match crate::get_context_provider() {
            Some(provider) => (provider.hart_id(), provider.pid(), provider.timestamp()),
            None => (0, 0, 0),
        };
        let entry = LogEntry::from_args(level, hart_id, pid, timestamp, args);
        self.buffer.write(&entry);

        if self.is_console_level(level) {
            direct_print_entry(&entry);
        }
    }

    /// 读取下一条日志
    pub fn _read_log(&self) -> Option<LogEntry> {
        self.buffer.read()
    }

    /// 按索引查看日志，不移动读指针
    pub fn _peek_log(&self, index: usize) -> Option<LogEntry> {
        self.buffer.peek(index)
    }

    /// 当前可读取的起始索引
    pub fn _log_reader_index(&self) -> usize {
        self.buffer.reader_index()
    }

    /// 当前写入位置
    pub fn _log_writer_index(&self) -> usize {
        self.buffer.writer_index()
    }

    /// 未读条目数
    pub fn _log_len(&self) -> usize {
        self.buffer.len()
    }

    /// 未读日志格式化后的字节数
    pub fn _log_unread_bytes(&self) -> usize {
        self.buffer.unread_bytes()
    }

    /// 因缓冲区满而丢弃的条目数
    pub fn _log_dropped_count(&self) -> usize {
        self.buffer.dropped_count()
    }

    /// 设置缓冲阈值
    pub fn _set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Release);
    }

    /// 缓冲阈值
    pub fn _get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Acquire))
    }

    /// 设置控制台阈值
    pub fn _set_console_level(&self, level: LogLevel) {
        self.console_level.store(level as u8, Ordering::Release);
    }

    /// 控制台阈值
    pub fn _get_console_level(&self) -> LogLevel {
        LogLevel::from_u8(self.console_level.load(Ordering::Acquire))
    }

    #[inline(always)]
    pub(crate) fn is_level_enabled(&self, level: LogLevel) -> bool {
        level as u8 <= self.global_level.load(Ordering::Acquire)
    }

    #[inline(always)]
    fn is_console_level(&self, level: LogLevel) -> bool {
        level as u8 <= self.console_level.load(Ordering::Acquire)
    }
}

/// 控制台输出适配：把 `fmt::Write` 转发给已注册的 [`LogOutput`](crate::LogOutput)
struct ConsoleWriter<'a>(&'a dyn crate::LogOutput);

impl Write for ConsoleWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

/// 直接打印到控制台
///
/// 只用栈和 `core::fmt`，堆分配器初始化之前也能使用。
fn direct_print_entry(entry: &LogEntry) {
    if let Some(output) = crate::get_log_output() {
        write_entry(output, entry);
    }
}

/// 把一个条目连同换行写到指定输出
pub(crate) fn write_entry(output: &dyn crate::LogOutput, entry: &LogEntry) {
    let _ = writeln!(ConsoleWriter(output), "{}", entry);
}

/// 把日志条目格式化为字符串（带颜色和上下文，不含换行）
pub fn format_log_entry(entry: &LogEntry) -> alloc::string::String {
    use alloc::string::ToString;
    entry.to_string()
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use crate::config::{GLOBAL_LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH};

    macro_rules! test_log {
        ($logger:expr, $level:expr, $($arg:tt)*) => {
            $logger._log($level, format_args!($($arg)*))
        };
    }

    fn quiet(global: LogLevel) -> LogCore {
        // 控制台阈值设为最严格，避免依赖已注册的输出
        LogCore::new(global, LogLevel::Emergency)
    }

    #[test]
    fn test_write_and_read_fifo() {
        let log = quiet(LogLevel::Debug);
        for i in 0..5 {
            test_log!(log, LogLevel::Info, "message {}", i);
        }
        assert_eq!(log._log_len(), 5);
        for i in 0..5 {
            let entry = log._read_log().unwrap();
            assert_eq!(entry.message(), alloc::format!("message {}", i));
            assert_eq!(entry.level(), LogLevel::Info);
        }
        assert!(log._read_log().is_none());
    }

    #[test]
    fn test_global_level_filtering() {
        let log = quiet(LogLevel::Warning);
        test_log!(log, LogLevel::Error, "error");
        test_log!(log, LogLevel::Warning, "warning");
        test_log!(log, LogLevel::Info, "info");
        test_log!(log, LogLevel::Debug, "debug");
        assert_eq!(log._log_len(), 2);

        log._set_global_level(LogLevel::Debug);
        test_log!(log, LogLevel::Debug, "debug2");
        assert_eq!(log._log_len(), 3);
        assert_eq!(log._get_global_level(), LogLevel::Debug);
    }

    #[test]
    fn test_truncation_keeps_utf8() {
        let log = quiet(LogLevel::Debug);
        test_log!(log, LogLevel::Info, "{}", "界".repeat(200));
        let entry = log._read_log().unwrap();
        assert!(entry.message().len() <= MAX_LOG_MESSAGE_LENGTH);
        assert!(entry.message().chars().all(|c| c == '界'));
        assert!(!entry.message().is_empty());
    }

    #[test]
    fn test_overflow_drops_newest() {
        let log = quiet(LogLevel::Debug);
        let total = GLOBAL_LOG_BUFFER_SIZE + 10;
        for i in 0..total {
            test_log!(log, LogLevel::Info, "entry {}", i);
        }
        assert_eq!(log._log_len(), GLOBAL_LOG_BUFFER_SIZE);
        assert_eq!(log._log_dropped_count(), 10);
        assert_eq!(log._read_log().unwrap().message(), "entry 0");

        while log._read_log().is_some() {}
        test_log!(log, LogLevel::Info, "after overflow");
        assert_eq!(log._read_log().unwrap().message(), "after overflow");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let log = quiet(LogLevel::Debug);
        test_log!(log, LogLevel::Info, "one");
        test_log!(log, LogLevel::Info, "two");

        let start = log._log_reader_index();
        assert_eq!(log._peek_log(start + 1).unwrap().message(), "two");
        assert!(log._peek_log(start + 2).is_none());
        assert_eq!(log._log_reader_index(), start);

        log._read_log();
        assert!(log._peek_log(start).is_none());
        assert_eq!(log._log_reader_index(), log._log_writer_index() - 1);
    }

    #[test]
    fn test_unread_bytes_match_format() {
        let log = quiet(LogLevel::Debug);
        test_log!(log, LogLevel::Info, "Hello");
        test_log!(log, LogLevel::Error, "World");
        let total = log._log_unread_bytes();

        let first = log._read_log().unwrap();
        let after_one = log._log_unread_bytes();
        assert_eq!(total - after_one, format_log_entry(&first).len());

        let second = log._read_log().unwrap();
        assert_eq!(after_one, format_log_entry(&second).len());
        assert_eq!(log._log_unread_bytes(), 0);
    }

    #[test]
    fn test_format_layout() {
        let entry = LogEntry::from_args(LogLevel::Warning, 0, 7, 42, format_args!("hi"));
        assert_eq!(
            format_log_entry(&entry),
            "\x1b[33m[WARNING] [          42] [HART0/P  7] hi\x1b[0m"
        );
    }
}
