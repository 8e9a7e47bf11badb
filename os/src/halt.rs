//! 停机
//!
//! 不可恢复的错误（未处理的陷阱、帧分配器簿记损坏、panic）都汇聚到这里：
//! 打印诊断信息与日志缓冲区中尚未读取的条目后在 `wfi` 中永久等待。
//! 输出直接写 UART，不经过任何锁。

use crate::console::emergency_writer;
use core::fmt::{self, Write};
use klog::LogOutput;
use sync::IntrGuard;
use trap::FatalTrap;

/// 不加锁的日志输出
struct EmergencyOutput;

impl LogOutput for EmergencyOutput {
    fn write_str(&self, s: &str) {
        let _ = emergency_writer().write_str(s);
    }
}

/// 打印 `Kernel Panic: <msg>` 后停机
pub fn halt(msg: &str) -> ! {
    halt_fmt(format_args!("{}", msg))
}

/// 同 [`halt`]，附带错误值
pub fn halt_with_error(msg: &str, err: impl fmt::Display) -> ! {
    halt_fmt(format_args!("{}: {}", msg, err))
}

/// 打印未处理陷阱的完整诊断信息后停机
pub fn fatal_trap(fatal: &FatalTrap) -> ! {
    let out = EmergencyOutput;
    out.write_str("Unexpected ");
    out.write_str(if fatal.trap.is_interrupt() {
        "interrupt"
    } else {
        "exception"
    });
    out.write_str("! scause=");
    out.write_hex(fatal.cause as u64);
    out.write_str(" sepc=");
    out.write_hex(fatal.epc as u64);
    out.write_str(" stval=");
    out.write_hex(fatal.tval as u64);
    out.write_str("\n");
    halt_with_error(fatal.message(), fatal.trap)
}

/// 打印格式化的停机信息
pub fn halt_fmt(args: fmt::Arguments<'_>) -> ! {
    // 永不释放：停机后不再进入任何陷阱
    let _guard = sync::arch_ops_registered().then(IntrGuard::new);
    let mut out = emergency_writer();
    let _ = writeln!(out, "Kernel Panic: {}", args);
    // 缓冲区里最近的日志，包括未达到控制台阈值的条目
    let _ = writeln!(out, "---- kernel log ----");
    klog::drain_log(&EmergencyOutput);
    let _ = writeln!(out, "Halting system.");
    loop {
        crate::arch::intr::wait_for_interrupt();
    }
}
