//! 定时器抢占端到端测试
//!
//! 用真实的调度器配合记录型上下文切换：进程被切入时，回调在它的陷阱快照上
//! 合成一次定时器中断并交给分发器，分发器通过调度器让出处理器。

use std::cell::RefCell;
use std::rc::Rc;

use mm::{FrameAllocator, FrameArena, MemoryLayout, PAGE_SIZE, Paddr};
use task::{ContextSwitch, Pid, ProcState, ProcessLayout, Scheduler, TaskContext, TrapFrame};
use test_support::mock::switch::RecordingSwitch;
use test_support::mock::timer::MockClint;
use trap::{
    BREAKPOINT_WIDTH, FatalReason, PrivilegeMode, TimerConfig, TimerDevice, TrapAction,
    TrapDispatcher,
};

const BASE: usize = 0x8000_0000;
const INTERRUPT: usize = 1 << 63;
const QUANTUM: u64 = 1_000_000;

struct TestSwitch {
    rec: RecordingSwitch,
}

impl ContextSwitch for TestSwitch {
    unsafe fn switch(&self, old: *mut TaskContext, new: *const TaskContext) {
        self.rec.record_switch(old as usize, new as usize);
    }

    fn first_run_entry(&self) -> usize {
        0
    }
}

struct Clint(MockClint);

impl TimerDevice for Clint {
    fn now(&self) -> u64 {
        self.0.mtime()
    }

    fn set_comparator(&self, hart: usize, deadline: u64) {
        self.0.set_mtimecmp(hart, deadline);
    }
}

/// 一次合成陷阱的观察结果
#[derive(Debug)]
struct Observed {
    pid: Pid,
    action: TrapAction,
    state_after: Option<ProcState>,
    sepc_before: usize,
    sepc_after: usize,
}

fn config() -> TimerConfig {
    TimerConfig {
        hart: 0,
        quantum: QUANTUM,
    }
}

fn setup(processes: usize) -> Rc<Scheduler<TestSwitch>> {
    let layout = MemoryLayout::new(BASE, 64 * PAGE_SIZE, PAGE_SIZE);
    let mut frames = FrameAllocator::new(layout).unwrap();
    frames.init();
    let mut mem = FrameArena::new();

    let sched = Rc::new(Scheduler::new(
        TestSwitch {
            rec: RecordingSwitch::new(),
        },
        ProcessLayout::minimal(),
        4,
    ));
    for i in 0..processes {
        let code = Paddr(BASE + (48 + i) * PAGE_SIZE);
        sched.create(&mut frames, &mut mem, code).unwrap();
    }
    sched
}

/// 每次切入进程都注入一次 `cause` 陷阱
fn inject(
    sched: &Rc<Scheduler<TestSwitch>>,
    clint: &Rc<Clint>,
    mode: PrivilegeMode,
    cause: usize,
    log: &Rc<RefCell<Vec<Observed>>>,
) {
    let weak = Rc::downgrade(sched);
    let clint = Rc::clone(clint);
    let log = Rc::clone(log);
    sched.switcher().rec.set_hook(move |_| {
        let Some(s) = weak.upgrade() else { return };
        let Some(pid) = s.current() else { return };
        let mut frame = s.with_process(pid, |p| p.trap_frame).unwrap();
        frame.scause = cause;
        let sepc_before = frame.sepc;

        let dispatcher = TrapDispatcher::new(&*clint, &*s, mode, config());
        let action = dispatcher.dispatch(&mut frame).unwrap();

        log.borrow_mut().push(Observed {
            pid,
            action,
            state_after: s.state_of(pid),
            sepc_before,
            sepc_after: frame.sepc,
        });
        clint.0.advance(QUANTUM);

        // 断点不会让出，这里模拟进程随后自愿让出
        if action == TrapAction::Resume {
            s.yield_now();
        }
    });
}

#[test]
fn test_timer_interrupt_preempts_running_process() {
    let sched = setup(2);
    let clint = Rc::new(Clint(MockClint::new(1, 5_000)));
    let log = Rc::new(RefCell::new(Vec::new()));
    inject(&sched, &clint, PrivilegeMode::Supervisor, INTERRUPT | 5, &log);

    assert_eq!(sched.sweep(), 2);

    let log = log.borrow();
    assert_eq!(log.len(), 2);
    for (i, obs) in log.iter().enumerate() {
        assert_eq!(obs.pid, i);
        assert_eq!(obs.action, TrapAction::Rescheduled);
        assert_eq!(obs.state_after, Some(ProcState::Runnable));
        assert_eq!(obs.sepc_after, obs.sepc_before);
        assert_eq!(obs.sepc_before, 0x1000);
    }
    // 第二次中断发生在前进了一个时间片之后
    assert_eq!(clint.0.mtimecmp(0), 5_000 + 2 * QUANTUM);
    assert_eq!(clint.0.writes(), 2);
    // 每个进程：切入一次，让出一次
    assert_eq!(sched.switcher().rec.switches().len(), 4);
    assert_eq!(sched.current(), None);
    assert_eq!(sched.runnable_count(), 2);
}

#[test]
fn test_preempted_processes_run_again_next_sweep() {
    let sched = setup(3);
    let clint = Rc::new(Clint(MockClint::new(1, 0)));
    let log = Rc::new(RefCell::new(Vec::new()));
    inject(&sched, &clint, PrivilegeMode::Supervisor, INTERRUPT | 5, &log);

    assert_eq!(sched.sweep(), 3);
    assert_eq!(sched.sweep(), 3);

    let pids: Vec<Pid> = log.borrow().iter().map(|o| o.pid).collect();
    assert_eq!(pids, vec![0, 1, 2, 0, 1, 2]);
    assert_eq!(clint.0.mtimecmp(0), 6 * QUANTUM);
}

#[test]
fn test_machine_timer_preempts_in_machine_mode() {
    let sched = setup(1);
    let clint = Rc::new(Clint(MockClint::new(1, 0)));
    let log = Rc::new(RefCell::new(Vec::new()));
    inject(&sched, &clint, PrivilegeMode::Machine, INTERRUPT | 7, &log);

    assert_eq!(sched.sweep(), 1);
    let log = log.borrow();
    assert_eq!(log[0].action, TrapAction::Rescheduled);
    assert_eq!(log[0].state_after, Some(ProcState::Runnable));
    assert_eq!(clint.0.mtimecmp(0), QUANTUM);
}

#[test]
fn test_breakpoint_resumes_without_yield() {
    let sched = setup(1);
    let clint = Rc::new(Clint(MockClint::new(1, 0)));
    let log = Rc::new(RefCell::new(Vec::new()));
    inject(&sched, &clint, PrivilegeMode::Supervisor, 3, &log);

    assert_eq!(sched.sweep(), 1);
    let log = log.borrow();
    assert_eq!(log[0].action, TrapAction::Resume);
    // 分发器返回时进程仍在运行
    assert_eq!(log[0].state_after, Some(ProcState::Running));
    assert_eq!(log[0].sepc_after, log[0].sepc_before + BREAKPOINT_WIDTH);
    assert_eq!(clint.0.writes(), 0);
}

#[test]
fn test_timer_with_no_current_process() {
    let sched = setup(0);
    let clint = Clint(MockClint::new(1, 100));
    let dispatcher = TrapDispatcher::new(&clint, &*sched, PrivilegeMode::Supervisor, config());

    let mut frame = TrapFrame {
        scause: INTERRUPT | 5,
        sepc: 0x8020_1000,
        ..TrapFrame::zero()
    };
    assert_eq!(dispatcher.dispatch(&mut frame), Ok(TrapAction::Resume));
    assert_eq!(frame.sepc, 0x8020_1000);
    assert_eq!(clint.0.mtimecmp(0), 100 + QUANTUM);
    assert!(sched.switcher().rec.switches().is_empty());
}

#[test]
fn test_fatal_trap_does_not_touch_scheduler() {
    let sched = setup(1);
    let clint = Clint(MockClint::new(1, 0));
    let dispatcher = TrapDispatcher::new(&clint, &*sched, PrivilegeMode::Supervisor, config());

    let mut frame = TrapFrame {
        scause: 2,
        sepc: 0x1010,
        stval: 0x0000_0073,
        ..TrapFrame::zero()
    };
    let fatal = dispatcher.dispatch(&mut frame).unwrap_err();
    assert_eq!(fatal.reason, FatalReason::UnhandledException);
    assert_eq!((fatal.cause, fatal.epc, fatal.tval), (2, 0x1010, 0x73));
    assert_eq!(frame.sepc, 0x1010);
    assert_eq!(sched.state_of(0), Some(ProcState::Runnable));
    assert_eq!(clint.0.writes(), 0);
}
