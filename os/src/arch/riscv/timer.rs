//! RISC-V 架构的定时器实现
//!
//! 计数器读自 `time` CSR，比较值通过 SBI `set_timer` 写入；
//! 该调用同时清除挂起的 S 态定时器中断。

use crate::config::TIMER_QUANTUM;
use riscv::register::time;
use trap::{TimerConfig, TimerDevice};

/// 通过 SBI 访问的定时器
pub struct SbiTimer;

impl TimerDevice for SbiTimer {
    fn now(&self) -> u64 {
        get_time() as u64
    }

    /// SBI 只能设置调用者所在 hart 的比较值，`hart` 仅用于日志
    fn set_comparator(&self, hart: usize, deadline: u64) {
        let ret = sbi_rt::set_timer(deadline);
        if ret.error != 0 {
            klog::pr_err!("[Timer] set_timer for hart {} failed: {:?}", hart, ret);
        }
    }
}

/// 全局定时器实例
pub static TIMER: SbiTimer = SbiTimer;

/// 获取当前硬件时钟周期数
#[inline]
pub fn get_time() -> usize {
    time::read()
}

/// 当前 hart 的定时器配置
pub fn config(hart: usize) -> TimerConfig {
    TimerConfig {
        hart,
        quantum: TIMER_QUANTUM,
    }
}

/// 初始化定时器：设置第一次中断并打开中断源
pub fn init(hart: usize) {
    let deadline = TIMER.program_next(&config(hart));
    // SAFETY: 只在内核初始化阶段、stvec 设置之后调用
    unsafe { crate::arch::intr::enable_timer_interrupt() };
    klog::pr_info!("[Timer] first deadline at {}", deadline);
}
