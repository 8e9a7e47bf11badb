//! 中断使能控制
//!
//! 内核态始终关闭 sstatus.SIE，只打开 sie.STIE；
//! 进程通过 sret 时的 SPIE 打开中断，定时器中断因此只会在进程运行时到来。

use super::constant::{Sie, Sstatus};
use core::arch::asm;

/// 读取并关闭 S 态中断，返回之前的 SIE 位
///
/// # Safety
/// 返回值必须原样交给 [`restore_interrupts`]
#[inline]
pub unsafe fn read_and_disable_interrupts() -> usize {
    let old: usize;
    unsafe { asm!("csrrc {}, sstatus, {}", out(reg) old, in(reg) Sstatus::SIE.bits()) };
    old & Sstatus::SIE.bits()
}

/// 恢复 [`read_and_disable_interrupts`] 之前的 SIE 位
///
/// # Safety
/// `flags` 必须来自 [`read_and_disable_interrupts`]
#[inline]
pub unsafe fn restore_interrupts(flags: usize) {
    if flags & Sstatus::SIE.bits() != 0 {
        unsafe { asm!("csrs sstatus, {}", in(reg) Sstatus::SIE.bits()) };
    }
}

/// 打开定时器中断源
///
/// # Safety
/// 只能在 stvec 已经指向陷阱入口之后调用
pub unsafe fn enable_timer_interrupt() {
    unsafe { asm!("csrs sie, {}", in(reg) Sie::STIE.bits()) };
}

/// 设置 sret 之后的状态：回到 S 态并打开中断
///
/// # Safety
/// 只能在即将通过 sret 进入进程的路径上调用
pub unsafe fn prepare_sret_to_process() {
    let bits = (Sstatus::SPP | Sstatus::SPIE).bits();
    unsafe { asm!("csrs sstatus, {}", in(reg) bits) };
}

/// 等待中断
#[inline]
pub fn wait_for_interrupt() {
    // SAFETY: wfi 没有副作用，关中断时也会在中断挂起时返回
    unsafe { asm!("wfi") };
}
