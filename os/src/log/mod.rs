//! 内核日志子系统
//!
//! 日志核心在 klog crate 中，这里注册 OS 层的上下文提供者与控制台输出，
//! 并把 `log` 门面接到 klog 上，使各子系统 crate 的日志进入同一个缓冲区。

pub use klog::{LogContextProvider, LogLevel, LogOutput};

use crate::config::{CONSOLE_LOG_LEVEL, LOG_LEVEL};
use crate::console::Stdout;
use crate::kernel::SCHEDULER;
use core::fmt::Write;
use core::sync::atomic::{AtomicUsize, Ordering};

static BOOT_HART: AtomicUsize = AtomicUsize::new(0);

/// 启动 hart 的编号
pub fn boot_hart() -> usize {
    BOOT_HART.load(Ordering::Relaxed)
}

/// OS 层的日志上下文提供者
struct OsLogContextProvider;

impl LogContextProvider for OsLogContextProvider {
    fn hart_id(&self) -> usize {
        boot_hart()
    }

    fn pid(&self) -> u32 {
        // 日志可能在调度器借用状态期间产生，只能尝试读取
        SCHEDULER.try_current().map_or(0, |pid| pid as u32)
    }

    fn timestamp(&self) -> usize {
        crate::arch::timer::get_time()
    }
}

/// OS 层的日志输出
struct OsLogOutput;

impl LogOutput for OsLogOutput {
    fn write_str(&self, s: &str) {
        let _ = Stdout.write_str(s);
    }
}

static OS_LOG_CONTEXT_PROVIDER: OsLogContextProvider = OsLogContextProvider;
static OS_LOG_OUTPUT: OsLogOutput = OsLogOutput;

/// 初始化日志系统
///
/// 必须在使用日志宏之前调用，且只能调用一次。
pub fn init(hartid: usize) {
    BOOT_HART.store(hartid, Ordering::Relaxed);
    // SAFETY: 两者都是 'static 实例，且此时只有启动 hart 在运行
    unsafe {
        klog::register_context_provider(&OS_LOG_CONTEXT_PROVIDER);
        klog::register_log_output(&OS_LOG_OUTPUT);
    }
    klog::set_global_level(LOG_LEVEL);
    klog::set_console_level(CONSOLE_LOG_LEVEL);
    if klog::init_log_bridge().is_err() {
        klog::pr_warn!("log: facade bridge already installed");
    }
}
