//! RISC-V 架构的陷阱（Trap）处理模块
//!
//! # 处理链路
//!
//! - 初始化：[`init`] 设置 `stvec` 指向汇编入口 `__trap_entry`。
//! - 入口汇编：`trap_entry.S` 把寄存器保存到 sscratch 指向的 [`TrapFrame`]
//!   （位于进程控制块中），切换到进程的内核栈，调用 [`trap_handler`]。
//! - Rust 分发：`trap_handler` 交给 [`trap::TrapDispatcher`]；定时器中断会在
//!   这里让出处理器，直到进程下一次被调度才返回。
//! - 恢复返回：`__trap_return` 按 TrapFrame 恢复寄存器并 `sret`。
//!   新进程的第一次运行也从这里进入（`__first_run`）。

mod trap_handler;

pub use trap_handler::trap_handler;

use core::arch::global_asm;
use riscv::register::{
    mtvec::TrapMode,
    stvec::{self, Stvec},
};

global_asm!(include_str!("trap_entry.S"));

unsafe extern "C" {
    unsafe fn __trap_entry();
    unsafe fn __first_run();
}

/// 初始化陷阱处理程序
pub fn init() {
    // Safe: 仅在内核初始化阶段调用，确保唯一性
    unsafe {
        stvec::write(Stvec::new(__trap_entry as usize, TrapMode::Direct));
    }
}

/// 新进程第一次被切入时的入口
pub fn first_run_entry() -> usize {
    __first_run as usize
}
