//! 陷阱分发器

use crate::cause::{Exception, Interrupt, Trap};
use crate::timer::{TimerConfig, TimerDevice};
use core::fmt;
use task::{ContextSwitch, Scheduler, TrapFrame};

/// 断点指令（压缩 `c.ebreak`）的宽度
pub const BREAKPOINT_WIDTH: usize = 2;

/// 指令地址未对齐时跳过的宽度
pub const INSTRUCTION_WIDTH: usize = 4;

/// 定时器中断时让出处理器的一方
pub trait Yield {
    /// 让当前进程让出处理器，重新被调度后返回 `true`；
    /// 没有当前进程时什么也不做并返回 `false`
    fn yield_now(&self) -> bool;
}

impl<S: ContextSwitch> Yield for Scheduler<S> {
    fn yield_now(&self) -> bool {
        Scheduler::yield_now(self)
    }
}

/// 陷阱发生时所在的特权级
///
/// 两者的分类逻辑完全相同，只是定时器中断的原因号不同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivilegeMode {
    /// S 态：定时器中断原因号 5
    #[default]
    Supervisor,
    /// M 态：定时器中断原因号 7
    Machine,
}

impl PrivilegeMode {
    /// 本特权级的定时器中断
    pub fn timer_interrupt(&self) -> Interrupt {
        match self {
            PrivilegeMode::Supervisor => Interrupt::SupervisorTimer,
            PrivilegeMode::Machine => Interrupt::MachineTimer,
        }
    }
}

/// 非致命陷阱处理完之后的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapAction {
    /// 从快照（可能已被修改）的恢复地址继续，期间没有发生切换
    Resume,
    /// 进程曾让出处理器，现在重新被调度，按快照继续
    Rescheduled,
}

/// 致命原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalReason {
    /// 没有处理程序的中断
    UnhandledInterrupt,
    /// 没有处理程序的异常
    UnhandledException,
    /// 恢复地址为 0 的指令地址未对齐异常
    MisalignedAtZero,
}

/// 不可恢复的陷阱，携带完整的诊断信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatalTrap {
    /// 解码后的陷阱
    pub trap: Trap,
    /// 原因寄存器原始值
    pub cause: usize,
    /// 恢复地址
    pub epc: usize,
    /// 陷阱值
    pub tval: usize,
    /// 致命原因
    pub reason: FatalReason,
}

impl FatalTrap {
    fn new(frame: &TrapFrame, trap: Trap, reason: FatalReason) -> Self {
        Self {
            trap,
            cause: frame.scause,
            epc: frame.sepc,
            tval: frame.stval,
            reason,
        }
    }

    /// 停机时打印的简短说明
    pub fn message(&self) -> &'static str {
        match self.reason {
            FatalReason::UnhandledInterrupt => "Unhandled interrupt",
            FatalReason::UnhandledException => "Unhandled exception",
            FatalReason::MisalignedAtZero => "EPC is 0 in misaligned exception",
        }
    }
}

impl fmt::Display for FatalTrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): cause={:#018x} epc={:#018x} tval={:#018x}",
            self.message(),
            self.trap,
            self.cause,
            self.epc,
            self.tval
        )
    }
}

/// 陷阱分发器
///
/// 只借用定时器与调度器，每次陷阱都可以就地构造。
pub struct TrapDispatcher<'a, T, Y> {
    timer: &'a T,
    yielder: &'a Y,
    mode: PrivilegeMode,
    config: TimerConfig,
}

impl<'a, T: TimerDevice, Y: Yield> TrapDispatcher<'a, T, Y> {
    /// 创建分发器
    pub fn new(timer: &'a T, yielder: &'a Y, mode: PrivilegeMode, config: TimerConfig) -> Self {
        Self {
            timer,
            yielder,
            mode,
            config,
        }
    }

    /// 处理一次陷阱
    ///
    /// 非致命时返回 `Ok`，调用方按 `frame` 恢复执行；
    /// 致命时返回 [`FatalTrap`]，调用方必须停机，不能恢复。
    pub fn dispatch(&self, frame: &mut TrapFrame) -> Result<TrapAction, FatalTrap> {
        let trap = Trap::decode(frame.scause);
        log::debug!(
            "trap: {} cause={:#x} epc={:#x} tval={:#x}",
            trap,
            frame.scause,
            frame.sepc,
            frame.stval
        );

        match trap {
            Trap::Interrupt(irq) if irq == self.mode.timer_interrupt() => {
                let deadline = self.timer.program_next(&self.config);
                log::trace!("trap: next timer deadline {}", deadline);
                if self.yielder.yield_now() {
                    Ok(TrapAction::Rescheduled)
                } else {
                    Ok(TrapAction::Resume)
                }
            }
            Trap::Interrupt(_) => {
                log::error!("trap: unhandled interrupt, cause={:#x}", frame.scause);
                Err(FatalTrap::new(frame, trap, FatalReason::UnhandledInterrupt))
            }
            Trap::Exception(Exception::Breakpoint) => {
                log::info!("trap: breakpoint at {:#x}", frame.sepc);
                frame.sepc = frame.sepc.wrapping_add(BREAKPOINT_WIDTH);
                Ok(TrapAction::Resume)
            }
            Trap::Exception(Exception::InstructionMisaligned) => {
                if frame.sepc == 0 {
                    log::error!("trap: misaligned instruction address with epc 0");
                    return Err(FatalTrap::new(frame, trap, FatalReason::MisalignedAtZero));
                }
                log::warn!("trap: misaligned instruction address at {:#x}", frame.sepc);
                frame.sepc = frame.sepc.wrapping_add(INSTRUCTION_WIDTH);
                Ok(TrapAction::Resume)
            }
            Trap::Exception(_) => {
                log::error!(
                    "trap: unhandled exception, cause={:#x} epc={:#x} tval={:#x}",
                    frame.scause,
                    frame.sepc,
                    frame.stval
                );
                Err(FatalTrap::new(frame, trap, FatalReason::UnhandledException))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::format;
    use core::cell::Cell;
    use test_support::mock::timer::MockClint;

    const INTERRUPT: usize = 1 << 63;

    #[derive(Default)]
    struct CountingYield(Cell<usize>);

    impl Yield for CountingYield {
        fn yield_now(&self) -> bool {
            self.0.set(self.0.get() + 1);
            true
        }
    }

    /// 没有当前进程的调度器
    struct IdleYield;

    impl Yield for IdleYield {
        fn yield_now(&self) -> bool {
            false
        }
    }

    fn frame(cause: usize, epc: usize, tval: usize) -> TrapFrame {
        TrapFrame {
            scause: cause,
            sepc: epc,
            stval: tval,
            ..TrapFrame::zero()
        }
    }

    fn config() -> TimerConfig {
        TimerConfig {
            hart: 0,
            quantum: 1_000_000,
        }
    }

    #[test]
    fn test_supervisor_timer_reprograms_and_yields() {
        let clint = MockClint::new(1, 42);
        let y = CountingYield::default();
        let d = TrapDispatcher::new(&clint, &y, PrivilegeMode::Supervisor, config());

        let mut tf = frame(INTERRUPT | 5, 0x1010, 0);
        assert_eq!(d.dispatch(&mut tf), Ok(TrapAction::Rescheduled));
        assert_eq!(clint.mtimecmp(0), 1_000_042);
        assert_eq!(clint.writes(), 1);
        assert_eq!(y.0.get(), 1);
        assert_eq!(tf.sepc, 0x1010);
    }

    #[test]
    fn test_timer_without_current_process_resumes() {
        let clint = MockClint::new(1, 7);
        let d = TrapDispatcher::new(&clint, &IdleYield, PrivilegeMode::Supervisor, config());

        let mut tf = frame(INTERRUPT | 5, 0x1010, 0);
        assert_eq!(d.dispatch(&mut tf), Ok(TrapAction::Resume));
        // 定时器照样重新编程
        assert_eq!(clint.mtimecmp(0), 1_000_007);
        assert_eq!(tf.sepc, 0x1010);
    }

    #[test]
    fn test_machine_mode_timer_code() {
        let clint = MockClint::new(1, 0);
        let y = CountingYield::default();
        let m = TrapDispatcher::new(&clint, &y, PrivilegeMode::Machine, config());

        let mut tf = frame(INTERRUPT | 7, 0x2000, 0);
        assert_eq!(m.dispatch(&mut tf), Ok(TrapAction::Rescheduled));

        // M 态下 S 态定时器中断没有处理程序
        let mut tf = frame(INTERRUPT | 5, 0x2000, 0);
        let err = m.dispatch(&mut tf).unwrap_err();
        assert_eq!(err.reason, FatalReason::UnhandledInterrupt);
        assert_eq!(y.0.get(), 1);
    }

    #[test]
    fn test_other_interrupt_is_fatal() {
        let clint = MockClint::new(1, 0);
        let y = CountingYield::default();
        let d = TrapDispatcher::new(&clint, &y, PrivilegeMode::Supervisor, config());

        let mut tf = frame(INTERRUPT | 9, 0x3000, 0);
        let err = d.dispatch(&mut tf).unwrap_err();
        assert_eq!(err.trap, Trap::Interrupt(Interrupt::SupervisorExternal));
        assert_eq!(err.cause, INTERRUPT | 9);
        assert_eq!(clint.writes(), 0);
        assert_eq!(y.0.get(), 0);
    }

    #[test]
    fn test_breakpoint_advances_by_two() {
        let clint = MockClint::new(1, 0);
        let y = CountingYield::default();
        let d = TrapDispatcher::new(&clint, &y, PrivilegeMode::Supervisor, config());

        let mut tf = frame(3, 0x1234, 0);
        assert_eq!(d.dispatch(&mut tf), Ok(TrapAction::Resume));
        assert_eq!(tf.sepc, 0x1236);
        assert_eq!(y.0.get(), 0);
    }

    #[test]
    fn test_misaligned_instruction() {
        let clint = MockClint::new(1, 0);
        let y = CountingYield::default();
        let d = TrapDispatcher::new(&clint, &y, PrivilegeMode::Supervisor, config());

        let mut tf = frame(0, 0x1002, 0x1002);
        assert_eq!(d.dispatch(&mut tf), Ok(TrapAction::Resume));
        assert_eq!(tf.sepc, 0x1006);

        let mut tf = frame(0, 0, 0);
        let err = d.dispatch(&mut tf).unwrap_err();
        assert_eq!(err.reason, FatalReason::MisalignedAtZero);
        assert_eq!(tf.sepc, 0);
    }

    #[test]
    fn test_resume_address_wraps_at_top_of_address_space() {
        let clint = MockClint::new(1, 0);
        let y = CountingYield::default();
        let d = TrapDispatcher::new(&clint, &y, PrivilegeMode::Supervisor, config());

        let mut tf = frame(3, usize::MAX - 1, 0);
        assert_eq!(d.dispatch(&mut tf), Ok(TrapAction::Resume));
        assert_eq!(tf.sepc, 0);

        let mut tf = frame(0, usize::MAX - 1, usize::MAX - 1);
        assert_eq!(d.dispatch(&mut tf), Ok(TrapAction::Resume));
        assert_eq!(tf.sepc, 2);
        assert_eq!(y.0.get(), 0);
    }

    #[test]
    fn test_unhandled_exception_carries_diagnostics() {
        let clint = MockClint::new(1, 0);
        let y = CountingYield::default();
        let d = TrapDispatcher::new(&clint, &y, PrivilegeMode::Supervisor, config());

        let mut tf = frame(13, 0x1008, 0xdead_beef);
        let err = d.dispatch(&mut tf).unwrap_err();
        assert_eq!(err.trap, Trap::Exception(Exception::LoadPageFault));
        assert_eq!((err.cause, err.epc, err.tval), (13, 0x1008, 0xdead_beef));
        assert_eq!(err.reason, FatalReason::UnhandledException);
        assert_eq!(
            format!("{}", err),
            "Unhandled exception (exception LoadPageFault): \
             cause=0x000000000000000d epc=0x0000000000001008 tval=0x00000000deadbeef"
        );
    }
}
