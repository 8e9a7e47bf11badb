//! 协作式切换的寄存器集合与切换原语

use crate::trap_frame::TrapFrame;
use mm::AddressSpace;

/// 被调用者保存的寄存器集合
///
/// ra、sp 与 s0..s11。每个 PCB 一份，调度器自己另有一份。
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskContext {
    /// 返回地址
    pub ra: usize,
    /// 栈指针
    pub sp: usize,
    /// s0..s11
    pub s: [usize; 12],
}

impl TaskContext {
    /// 全零上下文
    pub const fn zero() -> Self {
        Self {
            ra: 0,
            sp: 0,
            s: [0; 12],
        }
    }

    /// 新进程的初始上下文：第一次被切入时在 `kstack_top` 上跳到 `entry`
    pub const fn first_run(entry: usize, kstack_top: usize) -> Self {
        Self {
            ra: entry,
            sp: kstack_top,
            s: [0; 12],
        }
    }
}

/// 上下文切换原语
///
/// 对称：调度器切入进程与进程让回调度器使用同一个原语。
/// 单核上控制流不会同时出现在两处，因此不需要任何锁。
pub trait ContextSwitch {
    /// 把当前的被调用者保存寄存器存入 `old`，再从 `new` 恢复并跳转过去
    ///
    /// 只有当某个上下文再切换回 `old` 时才会返回。
    ///
    /// # Safety
    /// `old` 与 `new` 必须指向有效且在切换期间保持存活的 [`TaskContext`]，
    /// 调用时不能持有任何会在另一侧被再次借用的状态。
    unsafe fn switch(&self, old: *mut TaskContext, new: *const TaskContext);

    /// 新进程第一次被切入时的入口地址
    fn first_run_entry(&self) -> usize;

    /// 切入进程之前安装它的地址空间与陷阱快照位置
    fn prepare(&self, _space: AddressSpace, _trap_frame: *mut TrapFrame) {}
}
