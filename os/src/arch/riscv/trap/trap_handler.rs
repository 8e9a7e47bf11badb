//! 陷阱处理的 Rust 入口

use crate::arch::timer::{self, TIMER};
use crate::kernel::SCHEDULER;
use task::TrapFrame;
use trap::{PrivilegeMode, TrapDispatcher};

/// 陷阱处理入口，由 `trap_entry.S` 调用
///
/// 返回要恢复的 TrapFrame。快照先复制到栈上再分发：定时器中断会在分发期间
/// 让出处理器，这段时间内调度器会重新借用进程表。
#[unsafe(no_mangle)]
pub extern "C" fn trap_handler(frame: *mut TrapFrame) -> *mut TrapFrame {
    // SAFETY: frame 是入口汇编刚写好的当前进程的 TrapFrame
    let mut snapshot = unsafe { frame.read() };

    let dispatcher = TrapDispatcher::new(
        &TIMER,
        &*SCHEDULER,
        PrivilegeMode::Supervisor,
        timer::config(crate::log::boot_hart()),
    );
    match dispatcher.dispatch(&mut snapshot) {
        Ok(_) => {
            // SAFETY: 进程不运行时没有人修改它的 TrapFrame
            unsafe { frame.write(snapshot) };
            frame
        }
        Err(fatal) => crate::halt::fatal_trap(&fatal),
    }
}
