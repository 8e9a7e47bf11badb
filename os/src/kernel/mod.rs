//! 进程管理
//!
//! 全局调度器与启动时创建的示例进程。进程运行在 S 态，拥有自己的 Sv39 页表：
//! 代码页位于固定入口地址，UART 与私有栈各占一页。陷阱入口、启动栈与进程表
//! 都在内核镜像里，因此每张页表还恒等映射内核镜像（跳过 `.text.user` 中
//! 各进程的代码页）以及本进程自己的内核栈帧。别的进程的栈、代码页和页表
//! 在这张页表下都不可达。

mod user;

use crate::arch::switch::RiscvSwitch;
use crate::config::{NPROC, PAGE_SIZE, USER_DEVICE_VA, USER_ENTRY_VA, USER_STACK_VA};
use crate::halt::{halt, halt_with_error};
use lazy_static::lazy_static;
use mm::{Paddr, PteFlags, Vaddr};
use task::{FixedMap, ProcessLayout, Scheduler, TaskError};

unsafe extern "C" {
    fn skernel();
    fn suser();
    fn euser();
    fn ekernel();
}

const RX: PteFlags = PteFlags::R.union(PteFlags::X);
const RWX: PteFlags = RX.union(PteFlags::W);

fn symbol(f: unsafe extern "C" fn()) -> usize {
    f as *const () as usize
}

lazy_static! {
    /// 内核镜像的恒等映射：`.text.user` 之前只读可执行，之后可读写可执行
    static ref KERNEL_IMAGE: [FixedMap; 2] = [
        FixedMap::identity(symbol(skernel), symbol(suser) - symbol(skernel), RX),
        FixedMap::identity(symbol(euser), symbol(ekernel) - symbol(euser), RWX),
    ];
}

fn process_layout() -> ProcessLayout {
    ProcessLayout {
        entry_va: Vaddr(USER_ENTRY_VA),
        device: FixedMap::identity(USER_DEVICE_VA, PAGE_SIZE, PteFlags::R.union(PteFlags::W)),
        user_stack_va: Some(Vaddr(USER_STACK_VA)),
        extra: &*KERNEL_IMAGE,
        kstack_flags: Some(PteFlags::R | PteFlags::W),
    }
}

lazy_static! {
    /// 全局调度器
    pub static ref SCHEDULER: Scheduler<RiscvSwitch> =
        Scheduler::new(RiscvSwitch, process_layout(), NPROC);
}

/// 重置进程表并创建示例进程
///
/// 资源不足只记录日志，簿记损坏则停机。
pub fn init() {
    SCHEDULER.init_table();
    for (name, entry) in user::workloads() {
        let created =
            crate::mm::with_frames(|frames, mem| SCHEDULER.create(frames, mem, Paddr(entry)));
        match created {
            Some(Ok(pid)) => klog::pr_info!("[Task] {} is process {}", name, pid),
            Some(Err(TaskError::Memory(err))) if err.is_fatal() => {
                halt_with_error("frame allocator corrupted", err)
            }
            Some(Err(err)) => klog::pr_err!("[Task] failed to create {}: {}", name, err),
            None => halt("frame allocator not initialized"),
        }
    }
}

/// 进入调度循环
pub fn run() -> ! {
    klog::pr_info!("[Task] {} runnable processes", SCHEDULER.runnable_count());
    SCHEDULER.scheduler_loop()
}
