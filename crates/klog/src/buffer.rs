//! 日志环形缓冲区
//!
//! 多生产者、单消费者。写者通过 CAS 预留序号，写完后发布该槽位的序号；
//! 读者只消费已发布的槽位。缓冲区满时丢弃新条目并计数，不覆盖未读数据。

use crate::config::GLOBAL_LOG_BUFFER_SIZE;
use crate::entry::{LogEntry, formatted_len};
use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

struct Slot {
    /// 已发布条目的序号 + 1；0 表示从未写入
    seq: AtomicUsize,
    entry: UnsafeCell<LogEntry>,
}

impl Slot {
    const fn new() -> Self {
        Self {
            seq: AtomicUsize::new(0),
            entry: UnsafeCell::new(LogEntry::empty()),
        }
    }
}

/// 定长日志环形缓冲区
pub struct GlobalLogBuffer {
    slots: [Slot; GLOBAL_LOG_BUFFER_SIZE],
    write_seq: AtomicUsize,
    read_seq: AtomicUsize,
    dropped: AtomicUsize,
    unread_bytes: AtomicUsize,
}

// SAFETY: 槽位的读写由序号协议串行化
unsafe impl Sync for GlobalLogBuffer {}

impl GlobalLogBuffer {
    /// 空缓冲区
    pub const fn new() -> Self {
        Self {
            slots: [const { Slot::new() }; GLOBAL_LOG_BUFFER_SIZE],
            write_seq: AtomicUsize::new(0),
            read_seq: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
            unread_bytes: AtomicUsize::new(0),
        }
    }

    /// 写入一条日志；缓冲区满时丢弃
    pub fn write(&self, entry: &LogEntry) {
        let seq = loop {
            let w = self.write_seq.load(Ordering::Relaxed);
            let r = self.read_seq.load(Ordering::Acquire);
            if w - r >= GLOBAL_LOG_BUFFER_SIZE {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            if self
                .write_seq
                .compare_exchange_weak(w, w + 1, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                break w;
            }
        };

        let slot = &self.slots[seq % GLOBAL_LOG_BUFFER_SIZE];
        // SAFETY: 序号 seq 只被本写者预留；读者在 seq 发布之前不会访问该槽位
        unsafe { *slot.entry.get() = entry.clone() };
        self.unread_bytes
            .fetch_add(formatted_len(entry), Ordering::Relaxed);
        slot.seq.store(seq + 1, Ordering::Release);
    }

    /// 按序号读取已发布的条目
    fn load(&self, seq: usize) -> Option<LogEntry> {
        let slot = &self.slots[seq % GLOBAL_LOG_BUFFER_SIZE];
        if slot.seq.load(Ordering::Acquire) != seq + 1 {
            return None;
        }
        // SAFETY: 槽位已发布，在读指针越过它之前写者不会重用
        Some(unsafe { (*slot.entry.get()).clone() })
    }

    /// 取出最旧的一条
    pub fn read(&self) -> Option<LogEntry> {
        let r = self.read_seq.load(Ordering::Relaxed);
        if r == self.write_seq.load(Ordering::Acquire) {
            return None;
        }
        let entry = self.load(r)?;
        self.unread_bytes
            .fetch_sub(formatted_len(&entry), Ordering::Relaxed);
        self.read_seq.store(r + 1, Ordering::Release);
        Some(entry)
    }

    /// 按全局序号查看条目，不移动读指针
    pub fn peek(&self, index: usize) -> Option<LogEntry> {
        let r = self.read_seq.load(Ordering::Acquire);
        let w = self.write_seq.load(Ordering::Acquire);
        if index < r || index >= w {
            return None;
        }
        self.load(index)
    }

    /// 读指针
    pub fn reader_index(&self) -> usize {
        self.read_seq.load(Ordering::Acquire)
    }

    /// 写指针
    pub fn writer_index(&self) -> usize {
        self.write_seq.load(Ordering::Acquire)
    }

    /// 未读条目数
    pub fn len(&self) -> usize {
        self.writer_index() - self.reader_index()
    }

    /// 未读条目格式化后的总字节数
    pub fn unread_bytes(&self) -> usize {
        self.unread_bytes.load(Ordering::Relaxed)
    }

    /// 因缓冲区满而丢弃的条目数
    pub fn dropped_count(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}
