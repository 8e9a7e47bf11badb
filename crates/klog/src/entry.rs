//! 日志条目
//!
//! 条目是定长的，消息直接格式化进内嵌的字节数组，不需要堆分配。

use crate::config::MAX_LOG_MESSAGE_LENGTH;
use crate::level::LogLevel;
use core::fmt::{self, Write};

/// 一条日志
#[derive(Clone)]
pub struct LogEntry {
    level: LogLevel,
    hart_id: usize,
    pid: u32,
    timestamp: usize,
    len: usize,
    message: [u8; MAX_LOG_MESSAGE_LENGTH],
}

/// 写满即截断的格式化目标，截断点保证落在 UTF-8 字符边界
struct TruncatingWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.len;
        let mut take = s.len().min(room);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

impl LogEntry {
    /// 空条目
    pub const fn empty() -> Self {
        Self {
            level: LogLevel::Debug,
            hart_id: 0,
            pid: 0,
            timestamp: 0,
            len: 0,
            message: [0; MAX_LOG_MESSAGE_LENGTH],
        }
    }

    /// 用格式化参数构造条目
    pub fn from_args(
        level: LogLevel,
        hart_id: usize,
        pid: u32,
        timestamp: usize,
        args: fmt::Arguments<'_>,
    ) -> Self {
        let mut entry = Self {
            level,
            hart_id,
            pid,
            timestamp,
            ..Self::empty()
        };
        let mut writer = TruncatingWriter {
            buf: &mut entry.message,
            len: 0,
        };
        let _ = writer.write_fmt(args);
        entry.len = writer.len;
        entry
    }

    /// 级别
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// 记录时所在的 hart
    pub fn hart_id(&self) -> usize {
        self.hart_id
    }

    /// 记录时正在运行的进程（没有则为 0）
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// 时间戳（定时器滴答）
    pub fn timestamp(&self) -> usize {
        self.timestamp
    }

    /// 消息文本
    pub fn message(&self) -> &str {
        // 写入时只会在字符边界截断
        core::str::from_utf8(&self.message[..self.len]).unwrap_or("")
    }
}

impl fmt::Display for LogEntry {
    /// 带颜色与上下文的单行格式，不含换行
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} [{:12}] [HART{}/P{:3}] {}{}",
            self.level.color_code(),
            self.level.as_str(),
            self.timestamp,
            self.hart_id,
            self.pid,
            self.message(),
            self.level.reset_color_code()
        )
    }
}

impl fmt::Debug for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEntry")
            .field("level", &self.level)
            .field("timestamp", &self.timestamp)
            .field("message", &self.message())
            .finish()
    }
}

/// 只统计长度的格式化目标
struct CountingWriter(usize);

impl Write for CountingWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// 条目格式化后的字节数
pub(crate) fn formatted_len(entry: &LogEntry) -> usize {
    let mut counter = CountingWriter(0);
    let _ = write!(counter, "{}", entry);
    counter.0
}
