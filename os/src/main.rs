//! Chimera - 一个 RISC-V S 态小内核
//!
//! 内核由 OpenSBI 在 S 态启动，管理一块物理内存的帧分配，为每个进程构建
//! Sv39 地址空间，并以协作式轮转的方式调度进程；定时器中断让正在运行的进程
//! 让出处理器。子系统逻辑位于 `crates/` 下可在主机上测试的 crate 中，
//! 本 crate 只负责把它们接到硬件上。

#![no_std]
#![no_main]

mod arch;
mod config;
mod console;
mod halt;
mod kernel;
mod log;
mod mm;

use core::panic::PanicInfo;

/// Rust 内核主入口点
///
/// 由 `entry.S` 在设置好启动栈后跳转过来，参数由固件传入。
#[unsafe(no_mangle)]
pub extern "C" fn rust_main(hartid: usize, dtb: usize) -> ! {
    arch::boot::main(hartid, dtb)
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    if let Some(location) = info.location() {
        halt::halt_fmt(format_args!(
            "{} at {}:{}",
            info.message(),
            location.file(),
            location.line()
        ))
    } else {
        halt::halt_fmt(format_args!("{}", info.message()))
    }
}
