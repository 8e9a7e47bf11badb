//! 进程控制块

use crate::context::TaskContext;
use crate::trap_frame::TrapFrame;
use mm::{AddressSpace, Paddr};

/// 进程号，即 PCB 在进程表中的槽位下标
pub type Pid = usize;

/// 进程状态
///
/// 没有退出状态：进程一旦创建就一直在 Runnable 与 Running 之间循环。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcState {
    /// 空闲槽位
    #[default]
    Unused,
    /// 保留，当前没有任何路径进入该状态
    Sleeping,
    /// 等待调度
    Runnable,
    /// 正在运行
    Running,
}

/// 进程控制块
#[derive(Debug, Clone)]
pub struct Pcb {
    /// 进程号
    pub pid: Pid,
    /// 状态
    pub state: ProcState,
    /// 内核栈所在的帧（栈向下生长，栈顶为帧尾）
    pub kstack: Option<Paddr>,
    /// 地址空间
    pub space: Option<AddressSpace>,
    /// 陷阱快照
    pub trap_frame: TrapFrame,
    /// 协作式切换的寄存器集合
    pub context: TaskContext,
}

impl Pcb {
    /// 处于 Unused 状态的空 PCB
    pub const fn unused(pid: Pid) -> Self {
        Self {
            pid,
            state: ProcState::Unused,
            kstack: None,
            space: None,
            trap_frame: TrapFrame::zero(),
            context: TaskContext::zero(),
        }
    }

    /// 内核栈顶
    pub fn kstack_top(&self) -> Option<usize> {
        self.kstack.map(|frame| frame.0 + mm::PAGE_SIZE)
    }
}
