//! 陷阱子系统
//!
//! 陷阱入口汇编保存好 [`TrapFrame`](task::TrapFrame) 之后调用
//! [`TrapDispatcher::dispatch`]。原因码在入口处一次性解码为 [`Trap`]，
//! 之后的逻辑只处理类型化的值：
//!
//! - 定时器中断：重新设置比较寄存器，然后让出处理器
//! - 断点：跳过断点指令后恢复
//! - 指令地址未对齐：恢复地址为 0 时致命，否则跳过一条指令
//! - 其它任何原因：返回 [`FatalTrap`]，由调用方停机

#![no_std]

mod cause;
mod dispatcher;
mod timer;

pub use cause::{Exception, Interrupt, Trap};
pub use dispatcher::{
    BREAKPOINT_WIDTH, FatalReason, FatalTrap, INSTRUCTION_WIDTH, PrivilegeMode, TrapAction,
    TrapDispatcher, Yield,
};
pub use timer::{DEFAULT_QUANTUM, TimerConfig, TimerDevice};
