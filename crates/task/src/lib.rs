//! 进程管理子系统
//!
//! 提供进程控制块、定长进程表以及协作式轮转调度器。
//!
//! # 组成
//!
//! - [`TrapFrame`]：陷阱入口保存的完整寄存器快照
//! - [`TaskContext`] / [`ContextSwitch`]：协作式切换的寄存器集合与切换原语接口
//! - [`Pcb`] / [`ProcessTable`]：进程控制块与进程表
//! - [`ProcessLayout`]：新进程地址空间的布局
//! - [`Scheduler`]：进程创建、调度循环与让出
//!
//! 上下文切换本身属于硬件边界，由 os crate 以汇编实现 [`ContextSwitch`]；
//! 本 crate 的其余部分是普通的顺序代码，可以在主机上测试。

#![no_std]

extern crate alloc;

mod context;
mod error;
mod layout;
mod pcb;
mod scheduler;
mod table;
mod trap_frame;

pub use context::{ContextSwitch, TaskContext};
pub use error::{TaskError, TaskResult};
pub use layout::{FixedMap, ProcessLayout};
pub use pcb::{Pcb, Pid, ProcState};
pub use scheduler::Scheduler;
pub use table::{NPROC, ProcessTable};
pub use trap_frame::TrapFrame;
