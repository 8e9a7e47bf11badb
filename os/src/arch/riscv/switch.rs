//! 上下文切换

use core::arch::{asm, global_asm};
use mm::AddressSpace;
use task::{ContextSwitch, TaskContext, TrapFrame};

global_asm!(include_str!("switch.S"));

unsafe extern "C" {
    unsafe fn __switch(old: *mut TaskContext, new: *const TaskContext);
}

/// RISC-V 上下文切换
pub struct RiscvSwitch;

impl ContextSwitch for RiscvSwitch {
    unsafe fn switch(&self, old: *mut TaskContext, new: *const TaskContext) {
        unsafe { __switch(old, new) };
    }

    fn first_run_entry(&self) -> usize {
        super::trap::first_run_entry()
    }

    /// 安装进程页表，sscratch 指向它的陷阱快照，并让 sret 回到 S 态且打开中断
    fn prepare(&self, space: AddressSpace, trap_frame: *mut TrapFrame) {
        // SAFETY: 每个进程页表都恒等映射了内核 RAM，切换 satp 后内核代码与数据仍然可访问
        unsafe {
            asm!("csrw satp, {}", "sfence.vma", in(reg) space.satp());
            asm!("csrw sscratch, {}", in(reg) trap_frame as usize);
            super::intr::prepare_sret_to_process();
        }
    }
}
